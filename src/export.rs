use std::path::Path;

use tokio::{fs::File, io::AsyncWriteExt};

use crate::parse::FacilityRecord;
use crate::{Error, Result};

/// Renders the records as CSV: header row, one row per record, no index column.
pub fn to_csv(records: &[FacilityRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Writes the records to `path`. An empty set writes nothing and returns `Error::EmptyResult`.
pub async fn write_csv(records: &[FacilityRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        return Err(Error::EmptyResult);
    }

    let bytes = to_csv(records)?;
    let mut file = File::create(path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    Ok(())
}
