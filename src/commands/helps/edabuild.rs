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

pub const HELP: &str = r#"Edabuild drives an external hdl transpiler through a build job.

Usage:
    edabuild [options]

Without options, transpiles 'warp-v.tlv' with SandPiper-SaaS into
'build_multifile/out1/warp-v_rtl.sv'.

Options:
    --tool <name>         backend to run the job with (default: sandpipersaas)
    --work-root <dir>     directory to create for the build (default: build_multifile)
    --job <file>          load the job description from a toml file
    --list                view registered tools and exit
    --verbose             display the commands being executed
    --color <when>        coloring: auto, always, never
    --version             print version information and exit
    --help, -h            print help information

Environment:
    SANDPIPER_SAAS        program used to run the SandPiper-SaaS transpiler"#;
