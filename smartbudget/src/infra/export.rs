use crate::domain::models::{Transaction, TransactionKind};

/// Renders transactions as CSV with the column layout of the given collection.
pub fn transactions_csv(kind: TransactionKind, rows: &[Transaction]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    match kind {
        TransactionKind::Income => writer.write_record(["Source", "Amount", "Date"])?,
        TransactionKind::Expense => {
            writer.write_record(["Category", "Amount", "Description", "Date"])?
        }
    }

    for tx in rows {
        let amount = tx.amount.to_string();
        let date = tx.date.to_rfc3339();
        match kind {
            TransactionKind::Income => {
                writer.write_record([tx.label.as_str(), amount.as_str(), date.as_str()])?
            }
            TransactionKind::Expense => writer.write_record([
                tx.label.as_str(),
                amount.as_str(),
                tx.description.as_deref().unwrap_or(""),
                date.as_str(),
            ])?,
        }
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush csv: {}", e.error()))
}
