use storefront_db::{DemoCatalog, DbPool};

use crate::commands::{open_migrated, prepare, CommandResult, Failure};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedMode {
    Load,
    Verify,
    Clean,
}

impl SeedMode {
    pub fn from_flags(verify: bool, clean: bool) -> Self {
        match (verify, clean) {
            (_, true) => Self::Clean,
            (true, false) => Self::Verify,
            (false, false) => Self::Load,
        }
    }
}

pub fn run(mode: SeedMode) -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated(&config).await?;
        let outcome = match mode {
            SeedMode::Load => load_and_verify(&pool).await,
            SeedMode::Verify => verify(&pool).await.map(|count| {
                format!("demo catalog verified: {count} products present")
            }),
            SeedMode::Clean => DemoCatalog::clean(&pool)
                .await
                .map(|removed| format!("removed {removed} demo products"))
                .map_err(|error| ("seed_execution", error.to_string(), 5u8)),
        };
        pool.close().await;
        outcome
    });

    match result {
        Ok(message) => CommandResult::success("seed", message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

async fn load_and_verify(pool: &DbPool) -> Result<String, Failure> {
    let seeded = DemoCatalog::load(pool)
        .await
        .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
    verify(pool).await?;

    let listing: Vec<String> =
        seeded.products_seeded.iter().map(|id| format!("  - {id}")).collect();
    Ok(format!("demo catalog loaded ({} products):\n{}", listing.len(), listing.join("\n")))
}

async fn verify(pool: &DbPool) -> Result<usize, Failure> {
    let verification = DemoCatalog::verify(pool)
        .await
        .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

    if verification.all_present {
        return Ok(verification.checks.len());
    }

    let failed: Vec<&str> = verification
        .checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect();
    Err(("seed_verification", verification_message(&failed), 6u8))
}

fn verification_message(failed: &[&str]) -> String {
    if failed.is_empty() {
        "some demo products failed to load".to_string()
    } else {
        format!("demo catalog verification failed for: {}", failed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_message_names_missing_products() {
        assert_eq!(
            verification_message(&["demo-smart-tv-32", "demo-wall-charger"]),
            "demo catalog verification failed for: demo-smart-tv-32, demo-wall-charger"
        );
        assert_eq!(verification_message(&[]), "some demo products failed to load");
    }

    #[test]
    fn clean_wins_over_other_flags() {
        assert_eq!(SeedMode::from_flags(false, false), SeedMode::Load);
        assert_eq!(SeedMode::from_flags(true, false), SeedMode::Verify);
        assert_eq!(SeedMode::from_flags(false, true), SeedMode::Clean);
    }
}
