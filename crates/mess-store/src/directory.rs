//! 住宿生名冊

use std::collections::BTreeMap;
use std::sync::RwLock;

use mess_core::{Resident, Result};

use crate::{read_guard, write_guard};

/// 住宿生名冊介面（由外部名冊系統提供，引擎只讀取）
pub trait ResidentDirectory: Send + Sync {
    /// 依ID查詢住宿生（含已退宿者）
    fn get(&self, resident_id: &str) -> Result<Option<Resident>>;

    /// 所有住宿生（含已退宿者，依ID排序）
    fn list(&self) -> Result<Vec<Resident>>;
}

/// 記憶體內住宿生名冊
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    residents: RwLock<BTreeMap<String, Resident>>,
}

impl InMemoryDirectory {
    /// 創建空的名冊
    pub fn new() -> Self {
        Self::default()
    }

    /// 由住宿生清單建立名冊
    pub fn from_residents<I>(residents: I) -> Self
    where
        I: IntoIterator<Item = Resident>,
    {
        Self {
            residents: RwLock::new(
                residents
                    .into_iter()
                    .map(|r| (r.resident_id.clone(), r))
                    .collect(),
            ),
        }
    }

    /// 新增或更新住宿生
    pub fn upsert(&self, resident: Resident) -> Result<()> {
        write_guard(&self.residents, "directory")?.insert(resident.resident_id.clone(), resident);
        Ok(())
    }

    /// 退宿（軟刪除），回傳住宿生是否存在
    pub fn withdraw(&self, resident_id: &str) -> Result<bool> {
        let mut residents = write_guard(&self.residents, "directory")?;
        match residents.get_mut(resident_id) {
            Some(resident) => {
                resident.withdraw();
                tracing::info!("住宿生 {} 已退宿", resident_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl ResidentDirectory for InMemoryDirectory {
    fn get(&self, resident_id: &str) -> Result<Option<Resident>> {
        Ok(read_guard(&self.residents, "directory")?
            .get(resident_id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Resident>> {
        Ok(read_guard(&self.residents, "directory")?
            .values()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_core::AccountStatus;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::from_residents(vec![
            Resident::new("S2".to_string(), "Ravi".to_string()),
            Resident::new("S1".to_string(), "Asha".to_string()),
        ])
    }

    #[test]
    fn test_lookup_and_list() {
        let dir = directory();

        assert_eq!(dir.get("S1").unwrap().unwrap().name, "Asha");
        assert!(dir.get("S9").unwrap().is_none());

        let ids: Vec<_> = dir.list().unwrap().into_iter().map(|r| r.resident_id).collect();
        assert_eq!(ids, vec!["S1", "S2"]);
    }

    #[test]
    fn test_withdraw_keeps_resident() {
        let dir = directory();

        assert!(dir.withdraw("S2").unwrap());
        assert!(!dir.withdraw("S9").unwrap());

        let ravi = dir.get("S2").unwrap().unwrap();
        assert_eq!(ravi.status, AccountStatus::Withdrawn);
        assert_eq!(dir.list().unwrap().len(), 2);
    }

    #[test]
    fn test_upsert_replaces() {
        let dir = directory();
        dir.upsert(Resident::new("S1".to_string(), "Asha K".to_string()).with_room_number("A-1".to_string()))
            .unwrap();

        let asha = dir.get("S1").unwrap().unwrap();
        assert_eq!(asha.name, "Asha K");
        assert_eq!(asha.room_number.as_deref(), Some("A-1"));
    }
}
