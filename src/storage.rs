use crate::errors::StorageError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// A missing file is an empty timesheet; an unreadable one is an error.
pub async fn load_data(path: &Path) -> Result<AppData, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
            error!("failed to parse data file {}: {err}", path.display());
            StorageError::Parse(err)
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("no data file at {}, starting empty", path.display());
            Ok(AppData::default())
        }
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            Err(StorageError::Read(err))
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(data).map_err(StorageError::Encode)?;
    fs::write(path, payload).await.map_err(StorageError::Write)?;
    Ok(())
}
