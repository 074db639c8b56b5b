use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use autoreg_core::{PhoneNumber, PhoneSelection};

use crate::RegistrationError;

/// Phone identities available for SMS verification and their usage counters
#[derive(Debug, Clone, Default)]
pub struct PhoneNumberPool {
    numbers: Vec<PhoneNumber>,
    selection: PhoneSelection,
    cursor: usize,
    next_id: u64,
}

impl PhoneNumberPool {
    pub fn new(selection: PhoneSelection) -> Self {
        Self {
            selection,
            ..Default::default()
        }
    }

    /// Pool seeded from `(number, active)` pairs; invalid or duplicate numbers are skipped
    pub fn from_entries<I, S>(selection: PhoneSelection, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        let mut pool = Self::new(selection);
        for (number, active) in entries {
            if let Ok(id) = pool.add(number.as_ref()).map(|p| p.id.clone()) {
                if !active {
                    let _ = pool.toggle_active(&id);
                }
            }
        }
        pool
    }

    pub fn numbers(&self) -> &[PhoneNumber] {
        &self.numbers
    }

    pub fn get(&self, id: &str) -> Option<&PhoneNumber> {
        self.numbers.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut PhoneNumber, RegistrationError> {
        self.numbers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RegistrationError::UnknownPhoneNumber(id.to_string()))
    }

    pub fn active_count(&self) -> usize {
        self.numbers.iter().filter(|p| p.is_active).count()
    }

    pub fn has_active(&self) -> bool {
        self.numbers.iter().any(|p| p.is_active)
    }

    /// Add a number (trimmed). Empty and duplicate numbers are rejected.
    pub fn add(&mut self, number: &str) -> Result<&PhoneNumber, RegistrationError> {
        let number = number.trim();
        if number.is_empty() {
            return Err(RegistrationError::EmptyPhoneNumber);
        }
        if self.numbers.iter().any(|p| p.number == number) {
            return Err(RegistrationError::DuplicatePhoneNumber(number.to_string()));
        }

        self.next_id += 1;
        let id = format!("phone-{}", self.next_id);
        info!(%id, number, "added phone number");
        self.numbers.push(PhoneNumber::new(id, number));
        Ok(&self.numbers[self.numbers.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Result<PhoneNumber, RegistrationError> {
        let pos = self
            .numbers
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RegistrationError::UnknownPhoneNumber(id.to_string()))?;
        let removed = self.numbers.remove(pos);
        info!(id, number = %removed.number, "removed phone number");
        Ok(removed)
    }

    /// Flip the active flag, returning the new value
    pub fn toggle_active(&mut self, id: &str) -> Result<bool, RegistrationError> {
        let phone = self.get_mut(id)?;
        phone.is_active = !phone.is_active;
        Ok(phone.is_active)
    }

    pub fn reset_count(&mut self, id: &str) -> Result<(), RegistrationError> {
        let phone = self.get_mut(id)?;
        phone.sms_received = 0;
        Ok(())
    }

    pub fn select_active(&mut self) -> Result<PhoneNumber, RegistrationError> {
        self.select_active_with(&mut rand::thread_rng())
    }

    /// Pick an active identity: uniform random, or rotating through the active set
    pub fn select_active_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<PhoneNumber, RegistrationError> {
        let active: Vec<&PhoneNumber> = self.numbers.iter().filter(|p| p.is_active).collect();
        if active.is_empty() {
            return Err(RegistrationError::NoActivePhoneNumbers);
        }

        let chosen = match self.selection {
            PhoneSelection::Random => active.choose(rng).copied(),
            PhoneSelection::RoundRobin => active.get(self.cursor % active.len()).copied(),
        }
        .cloned()
        .ok_or(RegistrationError::NoActivePhoneNumbers)?;

        if self.selection == PhoneSelection::RoundRobin {
            self.cursor = self.cursor.wrapping_add(1);
        }
        Ok(chosen)
    }

    /// Count one SMS verification against the identity
    pub fn record_usage(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), RegistrationError> {
        let phone = self.get_mut(id)?;
        phone.sms_received += 1;
        phone.last_used = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_add_rejects_empty_and_duplicates() {
        let mut pool = PhoneNumberPool::default();
        let id = pool.add(" +81 90-1234-5678 ").unwrap().id.clone();
        assert_eq!(pool.get(&id).unwrap().number, "+81 90-1234-5678");
        assert_eq!(pool.add("   "), Err(RegistrationError::EmptyPhoneNumber));
        assert_eq!(
            pool.add("+81 90-1234-5678"),
            Err(RegistrationError::DuplicatePhoneNumber("+81 90-1234-5678".to_string()))
        );
        assert_eq!(pool.numbers().len(), 1);
    }

    #[test]
    fn test_select_fails_without_active_numbers() {
        let mut pool = PhoneNumberPool::default();
        assert_eq!(pool.select_active(), Err(RegistrationError::NoActivePhoneNumbers));

        let id = pool.add("090-0000-0001").unwrap().id.clone();
        assert!(!pool.toggle_active(&id).unwrap());
        assert_eq!(pool.select_active(), Err(RegistrationError::NoActivePhoneNumbers));
        assert!(!pool.has_active());
    }

    #[test]
    fn test_random_selection_only_returns_active() {
        let mut pool = PhoneNumberPool::from_entries(
            PhoneSelection::Random,
            vec![("090-1", true), ("090-2", false), ("090-3", true)],
        );
        assert_eq!(pool.active_count(), 2);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let phone = pool.select_active().unwrap();
            assert!(phone.is_active);
            seen.insert(phone.number);
        }
        assert_eq!(seen, HashSet::from(["090-1".to_string(), "090-3".to_string()]));
    }

    #[test]
    fn test_round_robin_rotates_active_numbers() {
        let mut pool = PhoneNumberPool::from_entries(
            PhoneSelection::RoundRobin,
            vec![("090-1", true), ("090-2", false), ("090-3", true)],
        );
        let picks: Vec<String> = (0..4).map(|_| pool.select_active().unwrap().number).collect();
        assert_eq!(picks, vec!["090-1", "090-3", "090-1", "090-3"]);
    }

    #[test]
    fn test_record_usage_and_reset_count() {
        let mut pool = PhoneNumberPool::default();
        let id = pool.add("090-1").unwrap().id.clone();
        let now = Utc::now();

        pool.record_usage(&id, now).unwrap();
        pool.record_usage(&id, now).unwrap();
        assert_eq!(pool.get(&id).unwrap().sms_received, 2);
        assert_eq!(pool.get(&id).unwrap().last_used, Some(now));

        pool.reset_count(&id).unwrap();
        assert_eq!(pool.get(&id).unwrap().sms_received, 0);

        assert_eq!(
            pool.record_usage("phone-404", now),
            Err(RegistrationError::UnknownPhoneNumber("phone-404".to_string()))
        );
    }

    #[test]
    fn test_remove() {
        let mut pool = PhoneNumberPool::default();
        let id = pool.add("090-1").unwrap().id.clone();
        assert_eq!(pool.remove(&id).unwrap().number, "090-1");
        assert!(pool.numbers().is_empty());
        assert!(pool.remove(&id).is_err());
    }
}
