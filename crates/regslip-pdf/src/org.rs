// SPDX-License-Identifier: Apache-2.0

/// Organization branding printed on every slip. Defaults mirror the
/// deployed branding; deployments override fields from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct OrgProfile {
    pub name: String,
    /// Mixed-case form used in prose and captions.
    pub display_name: String,
    pub acronym: String,
    pub slogan: String,
    pub heading: String,
    pub certification: String,
    pub footer_line: String,
    pub footer_note: String,
    /// Raw PNG bytes for the centered header logo. `None` or an
    /// undecodable image leaves the header without a logo.
    pub logo_png: Option<Vec<u8>>,
}

impl Default for OrgProfile {
    fn default() -> Self {
        Self {
            name: "YOBE TECH CONNECT".to_string(),
            display_name: "Yobe Tech Connect".to_string(),
            acronym: "YTC".to_string(),
            slogan: "Building Yobe Through Innovation and Unity".to_string(),
            heading: "REGISTRATION ACKNOWLEDGMENT SLIP".to_string(),
            certification: "This is to certify that the bearer of this slip has successfully \
                            completed registration with Yobe Tech Connect (YTC).\n\n\
                            We acknowledge your commitment to innovation, technology, and youth \
                            development.\n\n\
                            Welcome to the Yobe Tech Connect (YTC) Family, where ideas grow, \
                            leaders emerge, and change begins."
                .to_string(),
            footer_line: "Powered by Yobe Tech Connect".to_string(),
            footer_note: "This is an official document for record and confirmation.".to_string(),
            logo_png: None,
        }
    }
}

impl OrgProfile {
    #[must_use]
    pub fn with_logo(mut self, logo_png: Vec<u8>) -> Self {
        self.logo_png = Some(logo_png);
        self
    }
}
