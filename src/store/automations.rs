use crate::ids::time_derived_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationStatus {
    Active,
    Inactive,
}

impl AutomationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: AutomationStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationStore {
    automations: Vec<Automation>,
}

impl AutomationStore {
    pub fn new(automations: Vec<Automation>) -> Self {
        Self { automations }
    }

    pub fn sample(now_ms: i64) -> Self {
        let seed = |id: &str, name: &str, description: &str, status, age_ms: i64| Automation {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            status,
            created_at: now_ms - age_ms,
        };

        Self::new(vec![
            seed(
                "a1",
                "Daily Data Sync",
                "Syncs database with CRM",
                AutomationStatus::Active,
                10_000_000,
            ),
            seed(
                "a2",
                "Report Generator",
                "Generates PDF reports",
                AutomationStatus::Inactive,
                5_000_000,
            ),
            seed(
                "a3",
                "Email Alert",
                "Sends emails on error",
                AutomationStatus::Active,
                200_000,
            ),
        ])
    }

    pub fn all(&self) -> &[Automation] {
        &self.automations
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.automations.len()
    }

    pub fn get(&self, id: &str) -> Option<&Automation> {
        self.automations.iter().find(|automation| automation.id == id)
    }

    /// Prepends an inactive placeholder automation.
    pub fn create(&self, now_ms: i64) -> (AutomationStore, String) {
        let id = time_derived_id(now_ms, |candidate| self.get(candidate).is_some());
        let automation = Automation {
            id: id.clone(),
            name: "New Automation".to_string(),
            description: "Description here...".to_string(),
            status: AutomationStatus::Inactive,
            created_at: now_ms,
        };

        let mut automations = Vec::with_capacity(self.automations.len() + 1);
        automations.push(automation);
        automations.extend(self.automations.iter().cloned());
        (AutomationStore { automations }, id)
    }
}
