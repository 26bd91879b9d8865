//! 住宿生模型

use serde::{Deserialize, Serialize};

/// 帳戶狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// 在住
    #[default]
    Active,
    /// 已退宿（軟刪除，歷史帳單仍可查詢）
    Withdrawn,
}

/// 住宿生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    /// 住宿生ID（唯一）
    pub resident_id: String,

    /// 姓名
    pub name: String,

    /// 系所
    pub department: Option<String>,

    /// 年級
    pub academic_year: Option<u8>,

    /// 房號
    pub room_number: Option<String>,

    /// 帳戶狀態
    #[serde(default)]
    pub status: AccountStatus,
}

impl Resident {
    /// 創建新的住宿生（預設為在住）
    pub fn new(resident_id: String, name: String) -> Self {
        Self {
            resident_id,
            name,
            department: None,
            academic_year: None,
            room_number: None,
            status: AccountStatus::Active,
        }
    }

    /// 建構器模式：設置系所
    pub fn with_department(mut self, department: String) -> Self {
        self.department = Some(department);
        self
    }

    /// 建構器模式：設置年級
    pub fn with_academic_year(mut self, year: u8) -> Self {
        self.academic_year = Some(year);
        self
    }

    /// 建構器模式：設置房號
    pub fn with_room_number(mut self, room: String) -> Self {
        self.room_number = Some(room);
        self
    }

    /// 建構器模式：設置帳戶狀態
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// 檢查是否在住
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// 退宿
    pub fn withdraw(&mut self) {
        self.status = AccountStatus::Withdrawn;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_resident() {
        let resident = Resident::new("S1".to_string(), "Asha".to_string())
            .with_department("CSE".to_string())
            .with_academic_year(2)
            .with_room_number("B-204".to_string());

        assert_eq!(resident.resident_id, "S1");
        assert_eq!(resident.department.as_deref(), Some("CSE"));
        assert_eq!(resident.academic_year, Some(2));
        assert!(resident.is_active());
    }

    #[test]
    fn test_withdraw_resident() {
        let mut resident = Resident::new("S2".to_string(), "Ravi".to_string());
        resident.withdraw();

        assert!(!resident.is_active());
        assert_eq!(resident.status, AccountStatus::Withdrawn);
    }

    #[test]
    fn test_resident_from_minimal_json() {
        let resident: Resident =
            serde_json::from_str(r#"{"resident_id":"S3","name":"Meera"}"#).unwrap();

        assert_eq!(resident.status, AccountStatus::Active);
        assert!(resident.room_number.is_none());
    }
}
