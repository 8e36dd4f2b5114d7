// Visual Dictionary - A streaming visual dictionary for the terminal
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Settings file is unreadable")]
    SettingsUnreadable,
    #[error("Provider credential missing")]
    MissingCredential,
    #[error("Lookup failed")]
    LookupFailed,
}

impl AppError {
    pub const SETTINGS_UNREADABLE_EXIT_CODE: i32 = 20;
    pub const MISSING_CREDENTIAL_EXIT_CODE: i32 = 21;
    pub const LOOKUP_FAILED_EXIT_CODE: i32 = 22;

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SettingsUnreadable => Self::SETTINGS_UNREADABLE_EXIT_CODE,
            Self::MissingCredential => Self::MISSING_CREDENTIAL_EXIT_CODE,
            Self::LookupFailed => Self::LOOKUP_FAILED_EXIT_CODE,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::SettingsUnreadable => {
                "The settings file could not be read. Fix or delete it, then retry."
            }
            Self::MissingCredential => {
                "No API key for the selected model. Run `/key <provider> <key>` in the REPL \
or set GEMINI_API_KEY."
            }
            Self::LookupFailed => "The lookup failed. See the message above for details.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            AppError::SettingsUnreadable.exit_code(),
            AppError::MissingCredential.exit_code(),
            AppError::LookupFailed.exit_code(),
        ];
        assert_eq!(codes, [20, 21, 22]);
    }
}
