use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub gender_id: i64,
    pub role_id: i64,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gender {
    pub id: i64,
    pub gender: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub role_type: String,
}

/// One page of a larger result set.
///
/// `current_page` is always within `1..=last_page` and `data` never holds
/// more than `per_page` items.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> PaginatedResult<T> {
    /// Slices `items` into the requested page. Out-of-range pages are clamped.
    pub fn paginate(items: Vec<T>, page: u32, per_page: u32) -> Self {
        let perPage = per_page.max(1);
        let total = items.len() as u64;
        let lastPage = (total.div_ceil(perPage as u64) as u32).max(1);
        let currentPage = page.clamp(1, lastPage);
        let skip = ((currentPage - 1) * perPage) as usize;

        let data = items.into_iter().skip(skip).take(perPage as usize).collect();

        Self {
            data,
            current_page: currentPage,
            last_page: lastPage,
            per_page: perPage,
            total,
        }
    }
}

impl<T> Default for PaginatedResult<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            current_page: 1,
            last_page: 1,
            per_page: crate::USERS_PER_PAGE,
            total: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsersEnvelope {
    pub users: PaginatedResult<User>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GendersEnvelope {
    pub genders: Vec<Gender>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RolesEnvelope {
    pub roles: Vec<Role>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserUpdated {
    pub message: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paginate_clamps_page_into_range() {
        let page = PaginatedResult::paginate((1..=23).collect::<Vec<u32>>(), 9, 10);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.data, vec![21, 22, 23]);
        assert_eq!(page.total, 23);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let page = PaginatedResult::paginate(Vec::<u32>::new(), 0, 10);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.last_page, 1);
        assert!(page.data.is_empty());
    }

    #[test]
    fn user_without_optional_fields_deserializes() {
        let raw = r#"{"id":3,"name":"Ana","email":"ana@example.com","gender_id":2,"role_id":1}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.avatar, None);
        assert_eq!(user.created_at, None);
    }
}
