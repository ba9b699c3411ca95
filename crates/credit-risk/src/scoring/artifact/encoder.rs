use serde::{Deserialize, Serialize};

/// Category-to-code lookup where the code is the label's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    pub categories: Vec<String>,
}

impl OrdinalEncoder {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category == label)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.categories.is_empty() {
            return Err("encoder has no categories".to_string());
        }
        for (index, category) in self.categories.iter().enumerate() {
            if self.categories[..index].contains(category) {
                return Err(format!("encoder lists '{category}' more than once"));
            }
        }
        Ok(())
    }
}
