//! Transient notifications stacked in the bottom-right corner.

use std::time::{Duration, Instant};

use egui::{Align2, Color32, Context, RichText};

use crate::ui::theme;

const TOAST_LIFETIME: Duration = Duration::from_secs(4);
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
    pub created: Instant,
}

#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Info, text.into(), Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Error, text.into(), Instant::now());
    }

    fn push(&mut self, kind: ToastKind, text: String, created: Instant) {
        self.items.push(Toast { kind, text, created });
        if self.items.len() > MAX_TOASTS {
            self.items.remove(0);
        }
    }

    /// Drop toasts older than their lifetime.
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|t| now.duration_since(t.created) < TOAST_LIFETIME);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn show(&mut self, ctx: &Context) {
        self.expire(Instant::now());
        if self.items.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, [-12.0, -(theme::STATUS_BAR_HEIGHT + 12.0)])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.items {
                    let (fill, icon) = match toast.kind {
                        ToastKind::Info => (theme::BG_HEADER, egui_phosphor::regular::INFO),
                        ToastKind::Error => (Color32::from_rgb(90, 30, 34), egui_phosphor::regular::WARNING),
                    };
                    egui::Frame::default()
                        .fill(fill)
                        .rounding(egui::Rounding::same(6.0))
                        .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE))
                        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                        .show(ui, |ui| {
                            ui.label(RichText::new(format!("{}  {}", icon, toast.text)).size(12.0));
                        });
                    ui.add_space(4.0);
                }
            });
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_and_cap() {
        let mut toasts = Toasts::default();
        let t0 = Instant::now();
        for i in 0..7 {
            toasts.push(ToastKind::Info, format!("n{i}"), t0);
        }
        assert_eq!(toasts.len(), MAX_TOASTS);
        assert_eq!(toasts.items[0].text, "n2");

        toasts.push(ToastKind::Error, "late".into(), t0 + Duration::from_secs(3));
        toasts.expire(t0 + TOAST_LIFETIME);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.items[0].kind, ToastKind::Error);
    }
}
