// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Association of launch agent plists with running processes.

launchd agent and daemon plists name the program they run either via the
`Program` key or as the first element of `ProgramArguments`. Given that
executable path, we can ask the operating system which processes are
currently running it.

Lookups are a single point-in-time query. Processes which exit or can't be
inspected while the process table is being enumerated are skipped.
*/

use {
    crate::FlatPlist,
    log::debug,
    plist::Value,
    std::path::{Path, PathBuf},
};

/// Key holding a launch agent's program path.
pub const PROGRAM_KEY: &str = "Program";

/// Key holding a launch agent's argument vector.
pub const PROGRAM_ARGUMENTS_KEY: &str = "ProgramArguments";

/// A running process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub executable: PathBuf,
    pub name: String,
}

/// Something that can enumerate running processes by executable.
pub trait ProcessLookup {
    /// Find running processes whose executable is exactly `executable`.
    fn processes_for_executable(&self, executable: &Path) -> Vec<ProcessRecord>;
}

/// [ProcessLookup] querying the operating system process table.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProcessLookup;

impl ProcessLookup for SystemProcessLookup {
    fn processes_for_executable(&self, executable: &Path) -> Vec<ProcessRecord> {
        let mut system = sysinfo::System::new();
        system.refresh_processes_specifics(
            sysinfo::ProcessRefreshKind::new().with_exe(sysinfo::UpdateKind::OnlyIfNotSet),
        );

        let mut records = system
            .processes()
            .iter()
            .filter_map(|(pid, process)| {
                // No executable means the process is gone or we lack access.
                let exe = process.exe()?;

                if exe == executable {
                    Some(ProcessRecord {
                        pid: pid.as_u32(),
                        executable: exe.to_path_buf(),
                        name: process.name().to_string(),
                    })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        records.sort_by_key(|r| r.pid);

        debug!(
            "found {} processes running {}",
            records.len(),
            executable.display()
        );

        records
    }
}

/// Resolve the program a launch agent plist runs.
///
/// `Program` takes precedence. Otherwise the first element of
/// `ProgramArguments` is used.
pub fn launch_agent_program(flat: &FlatPlist) -> Option<PathBuf> {
    if let Some(Value::String(program)) = flat.get(PROGRAM_KEY) {
        return Some(PathBuf::from(program));
    }

    match flat.get(PROGRAM_ARGUMENTS_KEY) {
        Some(Value::Array(args)) => match args.first() {
            Some(Value::String(program)) => Some(PathBuf::from(program)),
            _ => None,
        },
        _ => None,
    }
}
