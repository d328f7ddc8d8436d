//! Inspect command - sample failure logs of one error type

use crate::classify::inspect::{sample_logs, ErrorTypeIndex};
use crate::cli::args::InspectArgs;
use crate::error::{MatrixError, MatrixResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::process::Command;
use tracing::{debug, warn};

/// Execute the inspect command
///
/// Sampled log paths go to stdout, one per line.
pub async fn execute(args: InspectArgs) -> MatrixResult<()> {
    let index = ErrorTypeIndex::load(&args.error_types).await?;
    let failures = index.failures(&args.error_type)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    debug!("Sampling {} of {} failures with seed {}", args.count, failures.len(), seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let logs = sample_logs(failures, &args.logs, args.count, &mut rng);

    for log in &logs {
        println!("{}", log.display());
        if !log.is_file() {
            warn!("Missing log {}", log.display());
            continue;
        }
        if let Some(program) = &args.open {
            let status = Command::new(program)
                .arg(log)
                .status()
                .await
                .map_err(|e| MatrixError::command_failed(program.clone(), e))?;
            if !status.success() {
                warn!("{} exited with {} for {}", program, status, log.display());
            }
        }
    }

    Ok(())
}
