use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{IndexValue, RecordRepository, StoreClient};
use crate::domain::{Bill, PaymentStatus};
use crate::error::StoreError;

const COLLECTION: &str = "bills";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillIndex {
    Installation,
    Code,
    Branch,
    PaymentStatus,
}

impl BillIndex {
    fn column(self) -> &'static str {
        match self {
            Self::Installation => "installation_id",
            Self::Code => "code",
            Self::Branch => "branch_id",
            Self::PaymentStatus => "payment_status",
        }
    }
}

/// Repository over the `bills` collection.
#[derive(Clone)]
pub struct BillRepository {
    store: StoreClient,
}

impl BillRepository {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    pub async fn get_unpaid(&self) -> Result<Vec<Bill>, StoreError> {
        self.get_by_index(BillIndex::PaymentStatus, PaymentStatus::Unpaid.into())
            .await
    }
}

fn bill_from_row(row: SqliteRow) -> Result<Bill, sqlx::Error> {
    let status: String = row.try_get("payment_status")?;
    Ok(Bill {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        branch_id: row.try_get("branch_id")?,
        installation_id: row.try_get("installation_id")?,
        name: row.try_get("name")?,
        bill_lbp: row.try_get("bill_lbp")?,
        bill_usd: row.try_get("bill_usd")?,
        payment_status: PaymentStatus::from_stored(&status),
        payment_date: row.try_get("payment_date")?,
    })
}

async fn put(conn: &mut SqliteConnection, b: &Bill) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR REPLACE INTO bills
            (id, code, branch_id, installation_id, name, bill_lbp, bill_usd,
             payment_status, payment_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(b.id)
    .bind(&b.code)
    .bind(&b.branch_id)
    .bind(&b.installation_id)
    .bind(&b.name)
    .bind(b.bill_lbp)
    .bind(b.bill_usd)
    .bind(b.payment_status.as_str())
    .bind(b.payment_date.as_deref())
    .execute(&mut *conn)
    .await?;

    Ok(b.id.unwrap_or_else(|| result.last_insert_rowid()))
}

#[async_trait]
impl RecordRepository for BillRepository {
    type Record = Bill;
    type Index = BillIndex;

    fn collection(&self) -> &'static str {
        COLLECTION
    }

    async fn add_all(&self, bills: &[Bill]) -> Result<Vec<i64>, StoreError> {
        let mut tx = self
            .store
            .pool()
            .begin()
            .await
            .map_err(StoreError::write(COLLECTION))?;

        let mut ids = Vec::with_capacity(bills.len());
        for b in bills {
            ids.push(put(&mut *tx, b).await.map_err(StoreError::write(COLLECTION))?);
        }

        tx.commit().await.map_err(StoreError::write(COLLECTION))?;

        tracing::debug!(count = ids.len(), "bills stored");
        Ok(ids)
    }

    async fn get_all(&self) -> Result<Vec<Bill>, StoreError> {
        sqlx::query("SELECT * FROM bills ORDER BY id")
            .try_map(bill_from_row)
            .fetch_all(self.store.pool())
            .await
            .map_err(StoreError::read(COLLECTION))
    }

    async fn update(&self, bill: &Bill) -> Result<(), StoreError> {
        if bill.id.is_none() {
            return Err(StoreError::MissingId { collection: COLLECTION });
        }

        let mut conn = self
            .store
            .pool()
            .acquire()
            .await
            .map_err(StoreError::write(COLLECTION))?;
        put(&mut *conn, bill)
            .await
            .map_err(StoreError::write(COLLECTION))?;

        Ok(())
    }

    async fn get_by_index(&self, index: BillIndex, value: IndexValue) -> Result<Vec<Bill>, StoreError> {
        let sql = format!("SELECT * FROM bills WHERE {} = ? ORDER BY id", index.column());
        let query = sqlx::query(&sql);
        let query = match value {
            IndexValue::Text(v) => query.bind(v),
            IndexValue::Flag(v) => query.bind(v),
        };

        query
            .try_map(bill_from_row)
            .fetch_all(self.store.pool())
            .await
            .map_err(StoreError::read(COLLECTION))
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM bills")
            .execute(self.store.pool())
            .await
            .map_err(StoreError::write(COLLECTION))?;

        tracing::info!("bills cleared");
        Ok(())
    }
}
