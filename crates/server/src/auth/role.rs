use archivist_discord::CommandInteraction;

/// Role-based gate for the `archive` command.
#[derive(Debug, Clone)]
pub struct RoleGate {
    required_role_id: Option<String>,
    required_role_name: String,
}

impl RoleGate {
    /// Gate on `required_role_id`. With no role configured nobody passes.
    pub fn new(required_role_id: Option<String>, required_role_name: impl Into<String>) -> Self {
        Self {
            required_role_id: required_role_id.filter(|id| !id.is_empty()),
            required_role_name: required_role_name.into(),
        }
    }

    /// Whether the invoking member holds the required role.
    pub fn permits(&self, command: &CommandInteraction) -> bool {
        self.required_role_id
            .as_deref()
            .is_some_and(|role| command.has_role(role))
    }

    /// Ephemeral text shown to a caller who lacks the role.
    pub fn rejection(&self) -> String {
        format!(
            "🚫 You don't have permission to archive this channel. Missing role: `{}` id: {}",
            self.required_role_name,
            self.required_role_id.as_deref().unwrap_or("<unset>")
        )
    }
}
