mod cli;
mod commands;
mod infra;
mod render;

use kafalat::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
