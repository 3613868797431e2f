use flexi_logger::Logger;

use crate::Error;

pub fn init() -> Result<(), Error> {
    // Logs go to stderr; stdout is reserved for command output.
    Logger::try_with_env_or_str("info")?
        .log_to_stderr()
        .start()?;

    Ok(())
}
