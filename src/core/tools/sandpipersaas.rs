//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Backend for the SandPiper-SaaS TL-Verilog transpiler.

use crate::core::backend::{Backend, Process};
use crate::core::job::{FileType, Job, ToolOptions};
use crate::error::Error;
use crate::util::anyerror::Fault;
use crate::util::args;
use crate::util::environment::{self, Environment};
use crate::util::filesystem;
use std::path::{Path, PathBuf};

pub const NAME: &str = "sandpipersaas";
pub const SUMMARY: &str = "transpile TL-Verilog into (System)Verilog with SandPiper-SaaS";

const DEFAULT_COMMAND: &str = "sandpiper-saas";
const MAKEFILE: &str = "Makefile";

const OPT_ARGS: &str = "sandpiper_saas";
const OPT_OUTPUT_FILE: &str = "output_file";
const OPT_OUTPUT_DIR: &str = "output_dir";
const OPT_ENDPOINT: &str = "endpoint";
const OPT_INCLUDES: &str = "includes";

const KNOWN_OPTIONS: [&str; 5] = [
    OPT_ARGS,
    OPT_OUTPUT_FILE,
    OPT_OUTPUT_DIR,
    OPT_ENDPOINT,
    OPT_INCLUDES,
];

/// Everything the transpiler needs, resolved from a job during configuration.
#[derive(Debug, PartialEq)]
struct Plan {
    source: String,
    includes: Vec<String>,
    output_file: String,
    output_dir: String,
    endpoint: Option<String>,
    /// Flags exactly as written in the job.
    flags: Vec<String>,
}

impl Plan {
    /// Assembles the arguments handed to the transpiler.
    fn to_args(&self) -> Result<Vec<String>, Error> {
        let mut result = vec![
            String::from("-i"),
            self.source.clone(),
            String::from("-o"),
            self.output_file.clone(),
            String::from("--outdir"),
            self.output_dir.clone(),
        ];
        if let Some(url) = &self.endpoint {
            result.push(String::from("--endpoint"));
            result.push(url.clone());
        }
        for flag in &self.flags {
            result.append(&mut args::split_words(flag)?);
        }
        Ok(result)
    }

    /// The output file's location relative to the work root.
    fn output_path(&self) -> PathBuf {
        filesystem::normalize(&Path::new(&self.output_dir).join(&self.output_file))
    }
}

pub struct SandpiperSaas {
    job: Job,
    work_root: PathBuf,
    command: Vec<String>,
    verbose: bool,
    plan: Option<Plan>,
    args: Vec<String>,
}

impl SandpiperSaas {
    /// Creates the backend for `job` to be built inside `work_root`.
    pub fn new(job: Job, work_root: PathBuf) -> Self {
        Self {
            job,
            work_root,
            command: vec![String::from(DEFAULT_COMMAND)],
            verbose: false,
            plan: None,
            args: Vec::new(),
        }
    }

    /// Creates the backend, reaching the transpiler through the `SANDPIPER_SAAS`
    /// environment variable when it is set.
    pub fn from_env(job: Job, work_root: PathBuf) -> Result<Self, Error> {
        Self::new(job, work_root).command_from_var(environment::SANDPIPER_SAAS)
    }

    fn command_from_var(self, key: &str) -> Result<Self, Error> {
        match Environment::read(key) {
            Some(cmd) => self.command(&cmd),
            None => Ok(self),
        }
    }

    /// Overrides the program (and any leading arguments) used to run the transpiler.
    pub fn command(mut self, cmd: &str) -> Result<Self, Error> {
        self.command = args::split_words(cmd)?;
        Ok(self)
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn get_str<'a>(opts: &'a ToolOptions, key: &str) -> Result<Option<&'a str>, Error> {
        match opts.get(key) {
            Some(v) => match v.as_str() {
                Some(s) => Ok(Some(s)),
                None => Err(Error::ToolOptionType(NAME.to_string(), key.to_string(), "a string")),
            },
            None => Ok(None),
        }
    }

    fn get_list<'a>(opts: &'a ToolOptions, key: &str) -> Result<Option<&'a Vec<String>>, Error> {
        match opts.get(key) {
            Some(v) => match v.as_list() {
                Some(l) => Ok(Some(l)),
                None => Err(Error::ToolOptionType(
                    NAME.to_string(),
                    key.to_string(),
                    "a list of strings",
                )),
            },
            None => Ok(None),
        }
    }

    /// Validates the job's options and files for this tool.
    fn plan(&self) -> Result<Plan, Error> {
        let empty = ToolOptions::new();
        let opts = self.job.get_tool_options(NAME).unwrap_or(&empty);

        if let Some(key) = opts.keys().find(|k| KNOWN_OPTIONS.contains(&k.as_str()) == false) {
            return Err(Error::UnknownToolOption(NAME.to_string(), key.to_string()));
        }

        let output_file = match Self::get_str(opts, OPT_OUTPUT_FILE)? {
            Some(f) => f.to_string(),
            None => {
                return Err(Error::MissingToolOption(
                    NAME.to_string(),
                    OPT_OUTPUT_FILE.to_string(),
                ))
            }
        };
        if output_file.ends_with(".v") == false && output_file.ends_with(".sv") == false {
            return Err(Error::BadOutputFile(output_file));
        }

        let sources: Vec<&str> = self
            .job
            .get_files()
            .iter()
            .filter(|f| f.get_file_type() == &FileType::TlVerilog && f.is_include_file() == false)
            .map(|f| f.get_name())
            .collect();
        let source = match sources.len() {
            0 => return Err(Error::NoSourceFiles(self.job.get_name().to_string(), FileType::TlVerilog)),
            1 => sources[0].to_string(),
            n => {
                return Err(Error::MultipleSourceFiles(
                    self.job.get_name().to_string(),
                    FileType::TlVerilog,
                    n,
                ))
            }
        };

        // include files are pulled in by the source itself
        let mut includes: Vec<String> = self
            .job
            .get_files()
            .iter()
            .filter(|f| f.is_include_file() == true)
            .map(|f| f.get_name().to_string())
            .collect();
        if let Some(list) = Self::get_list(opts, OPT_INCLUDES)? {
            includes.extend(list.iter().cloned());
        }

        let plan = Plan {
            source,
            includes,
            output_file,
            output_dir: Self::get_str(opts, OPT_OUTPUT_DIR)?.unwrap_or(".").to_string(),
            endpoint: Self::get_str(opts, OPT_ENDPOINT)?.map(|s| s.to_string()),
            flags: Self::get_list(opts, OPT_ARGS)?.cloned().unwrap_or_default(),
        };
        // catch malformed flags before anything is written
        plan.to_args()?;
        Ok(plan)
    }

    /// Creates the contents of a Makefile that reproduces the build by hand.
    fn render_makefile(&self, plan: &Plan) -> Result<String, Error> {
        let join = |words: &[String]| {
            words
                .iter()
                .map(|w| args::quote_word(w))
                .collect::<Vec<String>>()
                .join(" ")
        };
        let target = args::escape_make(&filesystem::into_std_str(&plan.output_path()));
        let prereqs = [vec![plan.source.clone()], plan.includes.clone()]
            .concat()
            .iter()
            .map(|w| args::escape_make(w))
            .collect::<Vec<String>>()
            .join(" ");

        let mut cmd = join(&plan.to_args()?[..6]);
        if let Some(url) = &plan.endpoint {
            cmd.push_str(&format!(" --endpoint {}", args::quote_word(url)));
        }
        // flags keep their original quoting
        for flag in &plan.flags {
            cmd.push(' ');
            cmd.push_str(flag);
        }

        Ok(format!(
            "\
# Generated by edabuild for job \"{job}\"
{var} ?= {program}

all: {target}

{target}: {prereqs}
\tmkdir -p {outdir}
\t$({var}) {cmd}

.PHONY: all
",
            job = self.job.get_name(),
            var = environment::SANDPIPER_SAAS,
            program = join(self.command.as_slice()),
            target = target,
            prereqs = prereqs,
            outdir = args::quote_word(&plan.output_dir),
            cmd = cmd,
        ))
    }
}

impl Process for SandpiperSaas {
    fn get_command(&self) -> &Vec<String> {
        &self.command
    }

    fn get_args(&self) -> Vec<String> {
        self.args.clone()
    }

    fn get_override_var(&self) -> &'static str {
        environment::SANDPIPER_SAAS
    }
}

impl Backend for SandpiperSaas {
    fn configure(&mut self) -> Result<(), Fault> {
        let plan = self.plan()?;
        // every input must be reachable from the work root
        for file in [vec![plan.source.clone()], plan.includes.clone()].concat() {
            let path = self.work_root.join(&file);
            if path.exists() == false {
                return Err(Error::SourceNotFound(path))?;
            }
        }
        std::fs::write(self.work_root.join(MAKEFILE), self.render_makefile(&plan)?)?;
        self.args = plan.to_args()?;
        self.plan = Some(plan);
        Ok(())
    }

    fn build(&mut self) -> Result<(), Fault> {
        let plan = match &self.plan {
            Some(p) => p,
            None => return Err(Error::BackendNotConfigured(NAME.to_string()))?,
        };
        std::fs::create_dir_all(self.work_root.join(&plan.output_dir))?;
        let envs = Environment::new().from_job(&self.job, NAME, &self.work_root);
        self.execute(&self.work_root, self.verbose, &envs)
    }

    fn run(&mut self) -> Result<(), Fault> {
        let plan = match &self.plan {
            Some(p) => p,
            None => return Err(Error::BackendNotConfigured(NAME.to_string()))?,
        };
        let output = self.work_root.join(plan.output_path());
        if output.exists() == false {
            return Err(Error::MissingOutput(output))?;
        }
        if self.verbose == true {
            println!("info: produced {:?}", output);
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::core::job::FileRecord;

    /// A stand-in transpiler that writes the requested output file.
    pub const FAKE_TRANSPILER: &str = r#"
src=""
out=""
dir="."
while [ $# -gt 0 ]; do
    case "$1" in
        -i) src="$2"; shift ;;
        -o) out="$2"; shift ;;
        --outdir) dir="$2"; shift ;;
    esac
    shift
done
[ -f "$src" ] || exit 4
mkdir -p "$dir"
echo "// $EDA_JOB_NAME from $src" > "$dir/$out"
"#;

    /// Creates a scratch directory holding `warp-v.tlv` and an existing work root.
    fn setup() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("warp-v.tlv"), "\\TLV\n").unwrap();
        let work = dir.path().join("build_multifile");
        std::fs::create_dir(&work).unwrap();
        (dir, work)
    }

    fn warp_v(dir: &Path, work: &Path) -> Job {
        Job::warp_v_from(&dir.join("warp-v.tlv"), work).unwrap()
    }

    fn job_with(opts: ToolOptions) -> Job {
        Job::new("custom")
            .file(FileRecord::new("../warp-v.tlv", FileType::TlVerilog))
            .tool_options(NAME, opts)
    }

    #[test]
    fn warp_v_arguments() {
        let (dir, work) = setup();
        let backend = SandpiperSaas::new(warp_v(dir.path(), &work), work);
        let plan = backend.plan().unwrap();
        assert_eq!(
            plan.to_args().unwrap(),
            vec![
                "-i",
                "../warp-v.tlv",
                "-o",
                "warp-v_rtl.sv",
                "--outdir",
                "out1",
                "--bestsv",
                "--inlineGen",
                "--m4def",
                "m5_CONFIG_EXPR=m5_def(STANDARD_CONFIG,4-stage)",
            ]
        );
        assert_eq!(plan.output_path(), PathBuf::from("out1/warp-v_rtl.sv"));
    }

    #[test]
    fn optional_options() {
        let (_dir, work) = setup();
        let job = job_with(
            ToolOptions::new()
                .set(OPT_OUTPUT_FILE, "core.v")
                .set(OPT_ENDPOINT, "https://example.com/compile")
                .set(OPT_INCLUDES, vec!["../defs.tlv"]),
        )
        .file(FileRecord::new("../pipe.tlv", FileType::TlVerilog).include());
        let plan = SandpiperSaas::new(job, work).plan().unwrap();
        assert_eq!(plan.output_dir, ".");
        assert_eq!(plan.output_path(), PathBuf::from("core.v"));
        assert_eq!(plan.includes, vec!["../pipe.tlv", "../defs.tlv"]);
        assert_eq!(
            plan.to_args().unwrap()[6..],
            ["--endpoint", "https://example.com/compile"]
        );
    }

    #[test]
    fn configure_writes_makefile() {
        let (dir, work) = setup();
        let mut backend = SandpiperSaas::new(warp_v(dir.path(), &work), work.clone())
            .command("sandpiper-saas")
            .unwrap();
        backend.configure().unwrap();
        let makefile = std::fs::read_to_string(work.join("Makefile")).unwrap();
        assert_eq!(
            makefile,
            "\
# Generated by edabuild for job \"build_tlv1\"
SANDPIPER_SAAS ?= sandpiper-saas

all: out1/warp-v_rtl.sv

out1/warp-v_rtl.sv: ../warp-v.tlv
\tmkdir -p out1
\t$(SANDPIPER_SAAS) -i ../warp-v.tlv -o warp-v_rtl.sv --outdir out1 --bestsv --inlineGen --m4def 'm5_CONFIG_EXPR=m5_def(STANDARD_CONFIG,4-stage)'

.PHONY: all
"
        );
    }

    #[test]
    fn makefile_escapes_spaces_in_rules() {
        let (dir, work) = setup();
        std::fs::write(dir.path().join("my core.tlv"), "\\TLV\n").unwrap();
        let job = Job::new("spaced")
            .file(FileRecord::new("../my core.tlv", FileType::TlVerilog))
            .tool_options(NAME, ToolOptions::new().set(OPT_OUTPUT_FILE, "core.sv"));
        let mut backend = SandpiperSaas::new(job, work.clone());
        backend.configure().unwrap();
        let makefile = std::fs::read_to_string(work.join("Makefile")).unwrap();
        assert!(makefile.contains("\ncore.sv: ../my\\ core.tlv\n"));
        assert!(makefile.contains("-i '../my core.tlv' -o core.sv"));
    }

    #[test]
    fn command_from_environment() {
        let (dir, work) = setup();
        let key = "EDABUILD_TEST_SANDPIPER_SAAS_OVERRIDE";
        std::env::set_var(key, "sh '/tmp/fake sandpiper.sh'");
        let backend = SandpiperSaas::new(warp_v(dir.path(), &work), work.clone())
            .command_from_var(key)
            .unwrap();
        assert_eq!(backend.get_command(), &vec!["sh", "/tmp/fake sandpiper.sh"]);

        // unset variables keep the default program
        let backend = SandpiperSaas::new(warp_v(dir.path(), &work), work)
            .command_from_var("EDABUILD_TEST_SANDPIPER_SAAS_UNSET")
            .unwrap();
        assert_eq!(backend.get_command(), &vec![DEFAULT_COMMAND]);
    }

    #[test]
    fn malformed_command_from_environment() {
        let (dir, work) = setup();
        let key = "EDABUILD_TEST_SANDPIPER_SAAS_MALFORMED";
        std::env::set_var(key, "sandpiper-saas --endpoint 'http://x");
        let err = SandpiperSaas::new(warp_v(dir.path(), &work), work)
            .command_from_var(key)
            .err();
        assert_eq!(
            err,
            Some(Error::UnbalancedQuote(String::from(
                "sandpiper-saas --endpoint 'http://x"
            )))
        );
    }

    #[test]
    fn option_errors() {
        let (_dir, work) = setup();
        let plan = |opts: ToolOptions| SandpiperSaas::new(job_with(opts), work.clone()).plan();

        assert_eq!(
            plan(ToolOptions::new()),
            Err(Error::MissingToolOption(NAME.to_string(), OPT_OUTPUT_FILE.to_string()))
        );
        assert_eq!(
            plan(ToolOptions::new().set(OPT_OUTPUT_FILE, "a.sv").set("sandpiper_jar", "x.jar")),
            Err(Error::UnknownToolOption(NAME.to_string(), String::from("sandpiper_jar")))
        );
        assert_eq!(
            plan(ToolOptions::new().set(OPT_OUTPUT_FILE, vec!["a.sv"])),
            Err(Error::ToolOptionType(
                NAME.to_string(),
                OPT_OUTPUT_FILE.to_string(),
                "a string"
            ))
        );
        assert_eq!(
            plan(ToolOptions::new().set(OPT_OUTPUT_FILE, "a.sv").set(OPT_ARGS, "--bestsv")),
            Err(Error::ToolOptionType(
                NAME.to_string(),
                OPT_ARGS.to_string(),
                "a list of strings"
            ))
        );
        assert_eq!(
            plan(ToolOptions::new().set(OPT_OUTPUT_FILE, "a.vhd")),
            Err(Error::BadOutputFile(String::from("a.vhd")))
        );
        assert_eq!(
            plan(ToolOptions::new().set(OPT_OUTPUT_FILE, "a.sv").set(OPT_ARGS, vec!["--m4def 'x"])),
            Err(Error::UnbalancedQuote(String::from("--m4def 'x")))
        );
    }

    #[test]
    fn source_file_errors() {
        let (_dir, work) = setup();
        let opts = ToolOptions::new().set(OPT_OUTPUT_FILE, "a.sv");

        let job = Job::new("empty")
            .file(FileRecord::new("a.sv", FileType::SystemVerilog))
            .tool_options(NAME, opts.clone());
        assert_eq!(
            SandpiperSaas::new(job, work.clone()).plan(),
            Err(Error::NoSourceFiles(String::from("empty"), FileType::TlVerilog))
        );

        let job = job_with(opts.clone()).file(FileRecord::new("../b.tlv", FileType::TlVerilog));
        assert_eq!(
            SandpiperSaas::new(job, work.clone()).plan(),
            Err(Error::MultipleSourceFiles(String::from("custom"), FileType::TlVerilog, 2))
        );

        let job = Job::new("missing")
            .file(FileRecord::new("../gone.tlv", FileType::TlVerilog))
            .tool_options(NAME, opts);
        let err = SandpiperSaas::new(job, work.clone()).configure().unwrap_err();
        assert!(err.to_string().starts_with("source file"));
        assert_eq!(work.join("Makefile").exists(), false);
    }

    #[test]
    fn steps_require_configure() {
        let (dir, work) = setup();
        let mut backend = SandpiperSaas::new(warp_v(dir.path(), &work), work);
        assert_eq!(
            backend.build().unwrap_err().to_string(),
            "tool \"sandpipersaas\" must be configured before it can build"
        );
        assert!(backend.run().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn lifecycle_with_fake_transpiler() {
        let (dir, work) = setup();
        let script = dir.path().join("fake.sh");
        std::fs::write(&script, FAKE_TRANSPILER).unwrap();

        let mut backend = SandpiperSaas::new(warp_v(dir.path(), &work), work.clone())
            .command(&format!("sh '{}'", script.display()))
            .unwrap();
        backend.configure().unwrap();
        backend.build().unwrap();
        backend.run().unwrap();

        let output = std::fs::read_to_string(work.join("out1/warp-v_rtl.sv")).unwrap();
        assert_eq!(output, "// build_tlv1 from ../warp-v.tlv\n");
    }

    #[cfg(unix)]
    #[test]
    fn failing_transpiler() {
        let (dir, work) = setup();
        let mut backend = SandpiperSaas::new(warp_v(dir.path(), &work), work.clone())
            .command("sh -c 'exit 2'")
            .unwrap();
        backend.configure().unwrap();
        assert_eq!(
            backend.build().unwrap_err().to_string(),
            "exited with error code: 2"
        );
        // no output means the result check fails too
        let err = backend.run().unwrap_err();
        assert!(err.to_string().starts_with("expected output file"));
    }
}
