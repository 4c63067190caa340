use crate::foundation::error::BackdropResult;

/// Niceness applied before rendering the desktop.
pub const BACKGROUND_NICENESS: i32 = 19;

/// Drop this process to the lowest scheduling priority.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn lower_process_priority() -> BackdropResult<()> {
    // SAFETY: setpriority only reads its scalar arguments and touches this process's niceness.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, BACKGROUND_NICENESS) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        return Err(anyhow::Error::new(err)
            .context("lower process priority")
            .into());
    }
    tracing::debug!(niceness = BACKGROUND_NICENESS, "lowered process priority");
    Ok(())
}

#[cfg(not(unix))]
pub fn lower_process_priority() -> BackdropResult<()> {
    tracing::debug!("process priority is left unchanged on this platform");
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/sched.rs"]
mod tests;
