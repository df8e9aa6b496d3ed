//! Sample records used by the demo run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection the demo writes into.
pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: u32,
}

/// Demo user record; `name` doubles as the resource key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub contact: String,
    pub address: Address,
}

impl User {
    fn new(name: &str, age: u32, contact: &str, address: Address) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            age,
            contact: contact.to_string(),
            address,
        }
    }
}

fn address(city: &str, pincode: u32) -> Address {
    Address {
        city: city.to_string(),
        state: "WB".to_string(),
        country: "ind".to_string(),
        pincode,
    }
}

/// Fixed employee roster seeded by the demo.
pub fn employees() -> Vec<User> {
    vec![
        User::new("Aron", 25, "12sefse", address("Sef", 70998)),
        User::new("Jon", 25, "sddse", address("Feo", 700071)),
        User::new("Vince", 31, "13fse", address("Tyo", 733188)),
        User::new("Leo", 35, "445e", address("Gro", 73314)),
    ]
}
