//! Secret keys consumed by the platform integrations.

pub const NSO_API_KEY: &str = "NSO_API_KEY";
pub const NSO_USERNAME: &str = "NSO_USERNAME";
pub const NSO_PASSWORD: &str = "NSO_PASSWORD";
pub const CISCO_API_KEY: &str = "CISCO_API_KEY";
pub const NETBOX_API_TOKEN: &str = "NETBOX_API_TOKEN";
pub const GITLAB_TOKEN: &str = "GITLAB_TOKEN";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

pub const WELL_KNOWN: &[&str] = &[
    NSO_API_KEY,
    NSO_USERNAME,
    NSO_PASSWORD,
    CISCO_API_KEY,
    NETBOX_API_TOKEN,
    GITLAB_TOKEN,
    OPENAI_API_KEY,
];

pub fn is_well_known(key: &str) -> bool {
    WELL_KNOWN.contains(&key)
}
