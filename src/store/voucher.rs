//! Voucher store
//!
//! `vouchers.json` maps a code to `{"type": ..., "consumed": ...}`. Two kinds of
//! vouchers share the file:
//! - run perks (`early`, `unlimited`, `disable`) are consumed on redemption
//! - lifeline grants (`fifty`, `call`) are attached on redemption and consumed
//!   only when the lifeline is actually used (`try_consume`)
//!
//! The `type` label is kept as written. Labels are matched case-insensitively and
//! a code with an unrecognised label behaves as if it did not exist.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::JsonFile;
use crate::error::{QuizError, QuizResult, StorageError};
use crate::types::{Redemption, VoucherKind, VoucherRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVoucher {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    consumed: bool,
}

impl StoredVoucher {
    fn kind(&self) -> Option<VoucherKind> {
        VoucherKind::parse(&self.kind)
    }
}

type VoucherDoc = BTreeMap<String, StoredVoucher>;

/// Find the stored key matching `code`, ignoring case and surrounding whitespace
fn find_key(doc: &VoucherDoc, code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    doc.keys().find(|k| k.eq_ignore_ascii_case(code)).cloned()
}

#[derive(Debug)]
pub struct VoucherStore {
    file: JsonFile,
    lock: Mutex<()>,
}

impl VoucherStore {
    /// Open the store, creating an empty document if needed
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let file = JsonFile::new(path);
        file.ensure_exists::<VoucherDoc>().await?;
        Ok(Self {
            file,
            lock: Mutex::new(()),
        })
    }

    /// Current state of a code. Codes with an unknown type are not reported.
    pub async fn lookup(&self, code: &str) -> Result<Option<VoucherRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        let doc: VoucherDoc = self.file.load_or_default().await?;

        Ok(find_key(&doc, code).and_then(|key| {
            let voucher = doc.get(&key)?;
            Some(VoucherRecord {
                kind: voucher.kind()?,
                consumed: voucher.consumed,
                code: key,
            })
        }))
    }

    /// Consume `code` iff it exists, is unconsumed and is of `required` kind.
    /// Returns whether this call consumed it; nothing is written otherwise.
    pub async fn try_consume(&self, code: &str, required: VoucherKind) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut doc: VoucherDoc = self.file.load_or_default().await?;

        let Some(key) = find_key(&doc, code) else {
            return Ok(false);
        };
        let Some(voucher) = doc.get_mut(&key) else {
            return Ok(false);
        };
        if voucher.consumed || voucher.kind() != Some(required) {
            return Ok(false);
        }

        voucher.consumed = true;
        self.file.save(&doc).await?;
        tracing::info!("Voucher {} consumed ({})", key, required.as_str());
        Ok(true)
    }

    /// Redeem a code typed into the shop
    pub async fn redeem(&self, code: &str) -> QuizResult<Redemption> {
        let _guard = self.lock.lock().await;
        let mut doc: VoucherDoc = self.file.load_or_default().await?;

        let key = find_key(&doc, code).ok_or(QuizError::VoucherNotFound)?;
        let voucher = doc.get_mut(&key).ok_or(QuizError::VoucherNotFound)?;
        let Some(kind) = voucher.kind() else {
            tracing::warn!("Voucher {} has unknown type '{}'", key, voucher.kind);
            return Err(QuizError::VoucherNotFound);
        };
        if voucher.consumed {
            return Err(QuizError::VoucherAlreadyUsed);
        }

        let redemption = kind.redemption();
        if let Redemption::Perk(_) = redemption {
            voucher.consumed = true;
            self.file.save(&doc).await?;
        }

        tracing::info!("Voucher {} redeemed: {:?}", key, redemption);
        Ok(redemption)
    }

    /// Add (or replace) a voucher
    #[cfg(test)]
    pub(crate) async fn issue(&self, code: &str, kind: VoucherKind) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut doc: VoucherDoc = self.file.load_or_default().await?;
        doc.insert(
            code.trim().to_uppercase(),
            StoredVoucher {
                kind: kind.as_str().to_string(),
                consumed: false,
            },
        );
        self.file.save(&doc).await
    }

    /// Hold the store lock, as a slow write would
    #[cfg(test)]
    pub(crate) async fn hold_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}
