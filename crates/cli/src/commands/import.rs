use std::fs;
use std::path::Path;

use storefront_db::repositories::SqlProductRepository;
use storefront_db::{import_catalog, ImportError};

use crate::commands::{open_migrated, prepare, CommandResult, Failure};

pub fn run(file: &Path) -> CommandResult {
    let raw = match fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "import",
                "input_file",
                format!("could not read `{}`: {error}", file.display()),
                7,
            );
        }
    };

    let (config, runtime) = match prepare("import") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated(&config).await?;
        let repository = SqlProductRepository::new(pool.clone());
        let outcome = import_catalog(&repository, &raw).await.map_err(classify);
        pool.close().await;
        outcome
    });

    match result {
        Ok(report) => CommandResult::success(
            "import",
            format!(
                "imported {} products from `{}` (skipped {} malformed records)",
                report.imported,
                file.display(),
                report.skipped
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("import", error_class, message, exit_code)
        }
    }
}

fn classify(error: ImportError) -> Failure {
    match error {
        ImportError::Malformed(_) => ("input_file", error.to_string(), 7),
        ImportError::Repository(_) => ("import_execution", error.to_string(), 5),
    }
}
