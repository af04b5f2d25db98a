use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;

/// The well-known "current object" slots of a task context.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContextSlot {
    Customer,
    Patient,
    Clinician,
    User,
    Till,
    Practice,
    Location,
    StockLocation,
    Supplier,
    Product,
    Deposit,
    Schedule,
    WorkList,
}

/// A reference to a persistent domain object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub archetype: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    pub fn new(archetype: &str, id: u64) -> Self {
        Self {
            archetype: archetype.to_string(),
            id,
            name: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.archetype, self.id)?;
        if let Some(name) = &self.name {
            write!(f, ":{name}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid reference {0:?}, expected archetype:id[:name]")]
pub struct ParseReferenceError(String);

impl FromStr for Reference {
    type Err = ParseReferenceError;

    /// Parses `archetype:id` or `archetype:id:name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, ':');
        let archetype = parts.next().filter(|a| !a.is_empty());
        let id = parts.next().and_then(|id| id.parse::<u64>().ok());
        match (archetype, id) {
            (Some(archetype), Some(id)) => {
                let reference = Reference::new(archetype, id);
                Ok(match parts.next().filter(|n| !n.is_empty()) {
                    Some(name) => reference.named(name),
                    None => reference,
                })
            }
            _ => Err(ParseReferenceError(s.to_string())),
        }
    }
}

/// The "current" domain objects a workflow run reads and populates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    #[serde(default)]
    slots: BTreeMap<ContextSlot, Reference>,
    /// Other objects, keyed by archetype short name.
    #[serde(default)]
    objects: BTreeMap<String, Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help_topic: Option<String>,
}

macro_rules! slot_accessors {
    ($($get:ident, $set:ident => $slot:ident;)*) => {
        $(
            pub fn $get(&self) -> Option<&Reference> {
                self.get(ContextSlot::$slot)
            }

            pub fn $set(&mut self, value: Option<Reference>) {
                self.set(ContextSlot::$slot, value);
            }
        )*
    };
}

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: ContextSlot, value: Reference) -> Self {
        self.set(slot, Some(value));
        self
    }

    pub fn get(&self, slot: ContextSlot) -> Option<&Reference> {
        self.slots.get(&slot)
    }

    /// Sets or clears a slot.
    pub fn set(&mut self, slot: ContextSlot, value: Option<Reference>) {
        match value {
            Some(value) => {
                self.slots.insert(slot, value);
            }
            None => {
                self.slots.remove(&slot);
            }
        }
    }

    /// The set slots, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (ContextSlot, &Reference)> {
        self.slots.iter().map(|(slot, value)| (*slot, value))
    }

    slot_accessors! {
        customer, set_customer => Customer;
        patient, set_patient => Patient;
        clinician, set_clinician => Clinician;
        user, set_user => User;
        till, set_till => Till;
        practice, set_practice => Practice;
        location, set_location => Location;
    }

    /// Stores an object under its archetype short name.
    pub fn add_object(&mut self, object: Reference) {
        self.objects.insert(object.archetype.clone(), object);
    }

    pub fn object(&self, short_name: &str) -> Option<&Reference> {
        self.objects.get(short_name)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Reference> {
        self.objects.values()
    }

    pub fn help_topic(&self) -> Option<&str> {
        self.help_topic.as_deref()
    }

    pub fn set_help_topic(&mut self, topic: Option<String>) {
        self.help_topic = topic;
    }

    /// Fills every empty well-known slot from `parent`. Slots already set
    /// are left alone.
    pub fn default_from(&mut self, parent: &TaskContext) {
        for slot in ContextSlot::iter() {
            if self.get(slot).is_some() {
                continue;
            }
            if let Some(value) = parent.get(slot) {
                self.slots.insert(slot, value.clone());
            }
        }
        if self.help_topic.is_none() {
            self.help_topic.clone_from(&parent.help_topic);
        }
    }

    /// Copies the listed slots into `parent`. An empty slot clears the
    /// parent's value.
    pub fn write_back(&self, parent: &mut TaskContext, slots: &[ContextSlot]) {
        for slot in slots {
            parent.set(*slot, self.get(*slot).cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn customer(id: u64) -> Reference {
        Reference::new("party.customerperson", id)
    }

    #[test]
    fn defaults_only_empty_slots() {
        let parent = TaskContext::new()
            .with(ContextSlot::Customer, customer(1))
            .with(ContextSlot::Till, Reference::new("party.organisationTill", 7));
        let mut context = TaskContext::new().with(ContextSlot::Customer, customer(2));
        context.default_from(&parent);
        assert_eq!(context.customer(), Some(&customer(2)));
        assert_eq!(context.till().map(|till| till.id), Some(7));
    }

    #[test]
    fn write_back_copies_and_clears() {
        let mut parent = TaskContext::new()
            .with(ContextSlot::Customer, customer(1))
            .with(ContextSlot::Patient, Reference::new("party.patientpet", 3));
        let mut context = TaskContext::new().with(ContextSlot::Customer, customer(2));
        context.set_clinician(Some(Reference::new("security.user", 9)));
        context.write_back(&mut parent, &[ContextSlot::Customer, ContextSlot::Patient]);
        assert_eq!(parent.customer(), Some(&customer(2)));
        assert_eq!(parent.patient(), None);
        assert_eq!(parent.clinician(), None);
    }

    #[test]
    fn parses_references() {
        assert_eq!(
            "party.patientpet:12:Fido".parse::<Reference>(),
            Ok(Reference::new("party.patientpet", 12).named("Fido"))
        );
        assert_eq!("party.patientpet:12".parse::<Reference>().map(|r| r.name), Ok(None));
        assert!("party.patientpet".parse::<Reference>().is_err());
        assert!(":12".parse::<Reference>().is_err());
        assert_eq!(ContextSlot::StockLocation.to_string(), "stock_location");
        assert_eq!("work_list".parse::<ContextSlot>(), Ok(ContextSlot::WorkList));
    }
}
