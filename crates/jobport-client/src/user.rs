//! Signed-in company as shown in the page header.

use jobport_models::Profile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiUser {
    pub id: String,
    pub display_name: String,
    pub avatar_initial: char,
}

impl UiUser {
    pub fn from_profile(profile: &Profile) -> Self {
        let display_name = [
            profile.company_name.as_deref(),
            profile.full_name.as_deref(),
            Some(profile.username.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or_default()
        .to_string();

        let avatar_initial = display_name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?');

        Self {
            id: profile.id.clone(),
            display_name,
            avatar_initial,
        }
    }
}
