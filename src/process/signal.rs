use std::io;

use crate::process::ProcessError;

use libc::{killpg, pid_t, ESRCH, SIGKILL};

// a group that is already gone is not an error
pub fn kill_group(pgid: u32) -> Result<(), ProcessError> {
    let pgid = pid_t::try_from(pgid)
        .map_err(|_| ProcessError::SignalError(format!("invalid process group {}", pgid)))?;

    let rc = unsafe { killpg(pgid, SIGKILL) };
    if rc == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(ESRCH) {
            return Ok(());
        }
        return Err(ProcessError::SignalError(err.to_string()));
    }
    Ok(())
}
