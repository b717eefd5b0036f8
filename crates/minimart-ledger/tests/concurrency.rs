//! Concurrent sales against a file-backed database.

mod common;

use std::path::PathBuf;

use minimart_core::ChainReport;
use minimart_ledger::{ErrorKind, Ledger, LedgerConfig};
use uuid::Uuid;

fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("minimart-{}.db", Uuid::new_v4()))
}

fn remove_db_files(path: &PathBuf) {
    let base = path.display().to_string();
    for file in [base.clone(), format!("{base}-wal"), format!("{base}-shm")] {
        let _ = std::fs::remove_file(file);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sales_never_oversell() {
    let path = temp_db_path();
    let config = LedgerConfig {
        database_path: path.clone(),
        max_connections: 5,
        ..LedgerConfig::default()
    };
    let ledger = Ledger::open(config).await.unwrap();
    let tea = common::product(&ledger, "Green Tea", 2_000, 10).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = ledger.clone();
        let product_id = tea.id.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .create_sale(common::cash_sale(&[(product_id.as_str(), 1)], 2_000))
                .await
        }));
    }

    let mut sold = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::InsufficientStock);
                rejected += 1;
            }
        }
    }

    assert_eq!(sold, 10);
    assert_eq!(rejected, 10);
    assert_eq!(common::stock_of(&ledger, &tea.id).await, 0);
    assert_eq!(ledger.recent_sales(Some(50)).await.unwrap().len(), 10);
    assert_eq!(
        ledger.verify_product_chain(&tea.id).await.unwrap(),
        ChainReport::Consistent { entries: 11, stock: 0 }
    );

    ledger.close().await;
    remove_db_files(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_chain_check_during_sales_stays_consistent() {
    let path = temp_db_path();
    let config = LedgerConfig {
        database_path: path.clone(),
        max_connections: 5,
        ..LedgerConfig::default()
    };
    let ledger = Ledger::open(config).await.unwrap();
    let milk = common::product(&ledger, "UHT Milk", 1_500, 30).await;

    let mut sales = Vec::new();
    for _ in 0..30 {
        let ledger = ledger.clone();
        let product_id = milk.id.clone();
        sales.push(tokio::spawn(async move {
            ledger
                .create_sale(common::cash_sale(&[(product_id.as_str(), 1)], 1_500))
                .await
        }));
    }

    let checker = {
        let ledger = ledger.clone();
        let product_id = milk.id.clone();
        tokio::spawn(async move {
            for _ in 0..40 {
                let report = ledger.verify_product_chain(&product_id).await.unwrap();
                assert!(report.is_consistent(), "mid-run report: {report:?}");
                tokio::task::yield_now().await;
            }
        })
    };

    for handle in sales {
        handle.await.unwrap().unwrap();
    }
    checker.await.unwrap();

    assert_eq!(
        ledger.verify_product_chain(&milk.id).await.unwrap(),
        ChainReport::Consistent { entries: 31, stock: 0 }
    );

    ledger.close().await;
    remove_db_files(&path);
}
