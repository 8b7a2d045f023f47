use serde::{Deserialize, Serialize};
use url::Url;

/// A contact directory entry, table `contact_categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactChannel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub contact_email: String,
    pub display_order: i64,
    pub is_active: bool,
}

impl ContactChannel {
    /// `mailto:` link with a "<name> Inquiry" subject line.
    pub fn mailto_link(&self) -> Result<Url, url::ParseError> {
        let mut link = Url::parse(&format!("mailto:{}", self.contact_email.trim()))?;
        link.set_query(Some(&format!("subject={} Inquiry", self.name)));
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailto_encodes_subject() {
        let channel = ContactChannel {
            id: "c1".into(),
            name: "Nikah Services".into(),
            description: None,
            contact_email: "nikah@example.org".into(),
            display_order: 1,
            is_active: true,
        };
        assert_eq!(
            channel.mailto_link().unwrap().as_str(),
            "mailto:nikah@example.org?subject=Nikah%20Services%20Inquiry"
        );
    }
}
