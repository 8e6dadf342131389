use leptos::logging::{error, log, warn};

/// User-facing notifications. Shown as blocking browser alerts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Notice {
    Saved,
    SaveFailed(String),
    EditRejected(String),
    ManualRefresh,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::Saved => "Item updated successfully.".to_string(),
            Self::SaveFailed(detail) => detail.clone(),
            Self::EditRejected(detail) => detail.clone(),
            Self::ManualRefresh => "Manual refresh of sensor data requested.".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::SaveFailed(_) | Self::EditRejected(_))
    }

    pub fn show(&self) {
        let message = self.message();
        if self.is_error() {
            error!("[notice] {message}");
        } else {
            log!("[notice] {message}");
        }

        if let Some(window) = web_sys::window() {
            if let Err(e) = window.alert_with_message(&message) {
                warn!("[notice] alert could not be shown: {e:?}");
            }
        }
    }
}
