//! Host facts domain types

use serde::{Deserialize, Serialize};

/// Default login of the partner account created by the baseline playbook
pub const DEFAULT_PARTNER_USER: &str = "parceiro";

/// Login of the superuser account
pub const ROOT_USER: &str = "root";

/// Key/value facts extracted from free-text playbook output
///
/// Every field is a plain string; an empty string means "not found yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    pub hostname: String,
    pub system: String,
    pub public_ip: String,
    pub private_ip: String,
    pub partner_user: String,
    pub partner_password: String,
    pub root_user: String,
    pub root_password: String,
}

impl Default for Facts {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            system: String::new(),
            public_ip: String::new(),
            private_ip: String::new(),
            partner_user: DEFAULT_PARTNER_USER.to_string(),
            partner_password: String::new(),
            root_user: ROOT_USER.to_string(),
            root_password: String::new(),
        }
    }
}

/// Identifies one extractable fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactField {
    Hostname,
    System,
    PublicIp,
    PrivateIp,
    PartnerUser,
    PartnerPassword,
    RootPassword,
}

impl FactField {
    pub const ALL: [FactField; 7] = [
        FactField::Hostname,
        FactField::System,
        FactField::PublicIp,
        FactField::PrivateIp,
        FactField::PartnerUser,
        FactField::PartnerPassword,
        FactField::RootPassword,
    ];
}

impl Facts {
    /// Facts with every field empty, including the account defaults
    ///
    /// Used as the neutral element when merging partial extraction results.
    pub fn blank() -> Self {
        Self {
            partner_user: String::new(),
            root_user: String::new(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: FactField) -> &str {
        match field {
            FactField::Hostname => &self.hostname,
            FactField::System => &self.system,
            FactField::PublicIp => &self.public_ip,
            FactField::PrivateIp => &self.private_ip,
            FactField::PartnerUser => &self.partner_user,
            FactField::PartnerPassword => &self.partner_password,
            FactField::RootPassword => &self.root_password,
        }
    }

    fn slot(&mut self, field: FactField) -> &mut String {
        match field {
            FactField::Hostname => &mut self.hostname,
            FactField::System => &mut self.system,
            FactField::PublicIp => &mut self.public_ip,
            FactField::PrivateIp => &mut self.private_ip,
            FactField::PartnerUser => &mut self.partner_user,
            FactField::PartnerPassword => &mut self.partner_password,
            FactField::RootPassword => &mut self.root_password,
        }
    }

    /// Sets `field` unless `value` is empty
    ///
    /// Returns true if the stored value changed.
    pub fn set(&mut self, field: FactField, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let slot = self.slot(field);
        if slot == value {
            return false;
        }
        *slot = value.to_string();
        true
    }

    /// Copies every non-empty field of `other` into `self`
    ///
    /// Empty fields of `other` never clear a value already held here.
    pub fn merge_from(&mut self, other: &Facts) -> bool {
        let mut changed = false;
        for field in FactField::ALL {
            changed |= self.set(field, other.get(field));
        }
        changed
    }

    /// Fills only the fields that are still empty here
    pub fn fill_missing(&mut self, other: &Facts) -> bool {
        let mut changed = false;
        for field in FactField::ALL {
            if self.get(field).is_empty() {
                changed |= self.set(field, other.get(field));
            }
        }
        changed
    }

    /// True once every extractable field holds a value
    pub fn is_complete(&self) -> bool {
        FactField::ALL.iter().all(|f| !self.get(*f).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accounts() {
        let facts = Facts::default();
        assert_eq!(facts.partner_user, "parceiro");
        assert_eq!(facts.root_user, "root");
        assert!(facts.hostname.is_empty());
        assert!(!facts.is_complete());
    }

    #[test]
    fn test_merge_never_clobbers_with_empty() {
        let mut facts = Facts::default();
        facts.hostname = "web01".to_string();

        let mut update = Facts::blank();
        update.system = "Ubuntu 22.04".to_string();

        assert!(facts.merge_from(&update));
        assert_eq!(facts.hostname, "web01");
        assert_eq!(facts.system, "Ubuntu 22.04");
        assert_eq!(facts.partner_user, "parceiro");
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut facts = Facts::blank();
        facts.private_ip = "10.0.0.5".to_string();

        let mut other = Facts::blank();
        other.private_ip = "192.168.0.1".to_string();
        other.public_ip = "203.0.113.9".to_string();

        assert!(facts.fill_missing(&other));
        assert_eq!(facts.private_ip, "10.0.0.5");
        assert_eq!(facts.public_ip, "203.0.113.9");
        assert!(!facts.fill_missing(&other));
    }
}
