use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{IndexValue, RecordRepository, StoreClient};
use crate::domain::MeterReading;
use crate::error::StoreError;

const COLLECTION: &str = "readings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingIndex {
    Installation,
    Code,
    Branch,
    Flagged,
}

impl ReadingIndex {
    fn column(self) -> &'static str {
        match self {
            Self::Installation => "installation_id",
            Self::Code => "code",
            Self::Branch => "branch_id",
            Self::Flagged => "flagged",
        }
    }
}

/// Repository over the `readings` collection.
#[derive(Clone)]
pub struct ReadingRepository {
    store: StoreClient,
}

impl ReadingRepository {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    pub async fn get_by_installation_id(&self, installation_id: &str) -> Result<Vec<MeterReading>, StoreError> {
        self.get_by_index(ReadingIndex::Installation, installation_id.into())
            .await
    }
}

fn reading_from_row(row: SqliteRow) -> Result<MeterReading, sqlx::Error> {
    Ok(MeterReading {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        installation_id: row.try_get("installation_id")?,
        branch_id: row.try_get("branch_id")?,
        compteur: row.try_get("compteur")?,
        inx_dep: row.try_get("inx_dep")?,
        meter_value: row.try_get("meter_value")?,
        name: row.try_get("name")?,
        obs: row.try_get("obs")?,
        usage: row.try_get("usage")?,
        seq: row.try_get("seq")?,
        reading_date: row.try_get("reading_date")?,
        flagged: row.try_get("flagged")?,
    })
}

async fn put(conn: &mut SqliteConnection, r: &MeterReading) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR REPLACE INTO readings
            (id, code, installation_id, branch_id, compteur, inx_dep, meter_value,
             name, obs, usage, seq, reading_date, flagged)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(r.id)
    .bind(&r.code)
    .bind(&r.installation_id)
    .bind(&r.branch_id)
    .bind(&r.compteur)
    .bind(&r.inx_dep)
    .bind(r.meter_value.as_deref())
    .bind(&r.name)
    .bind(&r.obs)
    .bind(&r.usage)
    .bind(&r.seq)
    .bind(r.reading_date.as_deref())
    .bind(r.flagged)
    .execute(&mut *conn)
    .await?;

    Ok(r.id.unwrap_or_else(|| result.last_insert_rowid()))
}

#[async_trait]
impl RecordRepository for ReadingRepository {
    type Record = MeterReading;
    type Index = ReadingIndex;

    fn collection(&self) -> &'static str {
        COLLECTION
    }

    async fn add_all(&self, records: &[MeterReading]) -> Result<Vec<i64>, StoreError> {
        let mut tx = self
            .store
            .pool()
            .begin()
            .await
            .map_err(StoreError::write(COLLECTION))?;

        let mut ids = Vec::with_capacity(records.len());
        for r in records {
            ids.push(put(&mut *tx, r).await.map_err(StoreError::write(COLLECTION))?);
        }

        tx.commit().await.map_err(StoreError::write(COLLECTION))?;

        tracing::debug!(count = ids.len(), "readings stored");
        Ok(ids)
    }

    async fn get_all(&self) -> Result<Vec<MeterReading>, StoreError> {
        sqlx::query("SELECT * FROM readings ORDER BY id")
            .try_map(reading_from_row)
            .fetch_all(self.store.pool())
            .await
            .map_err(StoreError::read(COLLECTION))
    }

    async fn update(&self, reading: &MeterReading) -> Result<(), StoreError> {
        if reading.id.is_none() {
            return Err(StoreError::MissingId { collection: COLLECTION });
        }

        let mut conn = self
            .store
            .pool()
            .acquire()
            .await
            .map_err(StoreError::write(COLLECTION))?;
        put(&mut *conn, reading)
            .await
            .map_err(StoreError::write(COLLECTION))?;

        Ok(())
    }

    async fn get_by_index(
        &self,
        index: ReadingIndex,
        value: IndexValue,
    ) -> Result<Vec<MeterReading>, StoreError> {
        let sql = format!(
            "SELECT * FROM readings WHERE {} = ? ORDER BY id",
            index.column()
        );
        let query = sqlx::query(&sql);
        let query = match value {
            IndexValue::Text(v) => query.bind(v),
            IndexValue::Flag(v) => query.bind(v),
        };

        query
            .try_map(reading_from_row)
            .fetch_all(self.store.pool())
            .await
            .map_err(StoreError::read(COLLECTION))
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM readings")
            .execute(self.store.pool())
            .await
            .map_err(StoreError::write(COLLECTION))?;

        tracing::info!("readings cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_store;

    fn reading(code: &str, installation: &str, branch: &str, name: &str) -> MeterReading {
        MeterReading {
            code: code.to_string(),
            installation_id: installation.to_string(),
            branch_id: branch.to_string(),
            compteur: format!("C-{code}"),
            inx_dep: "1000".to_string(),
            name: name.to_string(),
            usage: "Residential".to_string(),
            seq: "1".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_all_assigns_unique_increasing_ids() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store);

        let ids = repo
            .add_all(&[
                reading("M001", "INST001", "B001", "John Doe"),
                reading("M002", "INST002", "B001", "Jane Smith"),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, Some(ids[0]));
        assert_eq!(all[0].name, "John Doe");
        assert_eq!(all[1].id, Some(ids[1]));
        assert_eq!(all[1].meter_value, None);
    }

    #[tokio::test]
    async fn add_all_with_existing_id_overwrites() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store);

        let ids = repo
            .add_all(&[reading("M001", "INST001", "B001", "John Doe")])
            .await
            .unwrap();

        let mut changed = reading("M001", "INST001", "B001", "John Doe");
        changed.id = Some(ids[0]);
        changed.meter_value = Some("1200".to_string());
        repo.add_all(&[changed.clone()]).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap(), vec![changed]);
    }

    #[tokio::test]
    async fn update_overwrites_by_id() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store);
        repo.add_all(&[reading("M001", "INST001", "B001", "John Doe")])
            .await
            .unwrap();

        let mut r = repo.get_all().await.unwrap().remove(0);
        r.meter_value = Some("1234".to_string());
        r.obs = "gate locked".to_string();
        r.flagged = true;
        repo.update(&r).await.unwrap();

        let stored = repo.get_all().await.unwrap();
        assert_eq!(stored, vec![r]);
    }

    #[tokio::test]
    async fn update_without_id_is_rejected() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store);

        let err = repo
            .update(&reading("M001", "INST001", "B001", "John Doe"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingId { .. }));
    }

    #[tokio::test]
    async fn update_of_unknown_id_inserts() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store);

        let mut r = reading("M009", "INST009", "B002", "Ghost");
        r.id = Some(42);
        repo.update(&r).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn get_by_index_matches_field() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store);
        repo.add_all(&[
            reading("M001", "INST001", "B001", "John Doe"),
            reading("M002", "INST002", "B001", "Jane Smith"),
            reading("M003", "INST003", "B002", "Ali Hassan"),
        ])
        .await
        .unwrap();

        let branch = repo
            .get_by_index(ReadingIndex::Branch, "B001".into())
            .await
            .unwrap();
        assert_eq!(branch.len(), 2);

        let by_inst = repo.get_by_installation_id("INST003").await.unwrap();
        assert_eq!(by_inst.len(), 1);
        assert_eq!(by_inst[0].name, "Ali Hassan");

        let by_code = repo
            .get_by_index(ReadingIndex::Code, "nope".into())
            .await
            .unwrap();
        assert!(by_code.is_empty());

        let mut flagged = by_inst[0].clone();
        flagged.flagged = true;
        repo.update(&flagged).await.unwrap();
        let hits = repo
            .get_by_index(ReadingIndex::Flagged, true.into())
            .await
            .unwrap();
        assert_eq!(hits, vec![flagged]);
    }

    #[tokio::test]
    async fn clear_all_empties_collection() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store);
        repo.add_all(&[reading("M001", "INST001", "B001", "John Doe")])
            .await
            .unwrap();

        repo.clear_all().await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());

        // Ids keep increasing after a clear.
        let ids = repo
            .add_all(&[reading("M002", "INST002", "B001", "Jane Smith")])
            .await
            .unwrap();
        assert!(ids[0] > 1);
    }

    #[tokio::test]
    async fn writes_fail_once_store_is_closed() {
        let (_dir, store) = temp_store().await;
        let repo = ReadingRepository::new(store.clone());
        store.close().await;

        let err = repo
            .add_all(&[reading("M001", "INST001", "B001", "John Doe")])
            .await
            .unwrap_err();
        assert!(err.is_write_failure());
    }
}
