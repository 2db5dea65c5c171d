mod cli;
mod commands;
mod infra;

use credit_engine::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
