use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::sync::Once;

use axum::body::Body;
use axum::http::Response;
use axum::response::IntoResponse;
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct RecoveryConfig {
    pub log_panics: bool,
    pub log_backtrace: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            log_panics: true,
            log_backtrace: true,
        }
    }
}

thread_local! {
    static PANIC_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static BACKTRACE_HOOK: Once = Once::new();

/// Records the backtrace at the panic site so the responder can log it.
/// The previous hook still runs.
fn install_backtrace_hook() {
    BACKTRACE_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(Backtrace::force_capture()));
            previous(info);
        }));
    });
}

/// Turns a caught panic into the uniform 500 response.
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    config: RecoveryConfig,
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let backtrace = PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take());

        if self.config.log_panics {
            tracing::error!(panic = %panic_message(err.as_ref()), "Panic recovered");
        }
        if self.config.log_backtrace {
            if let Some(backtrace) = backtrace {
                tracing::error!("Stack trace:\n{}", backtrace);
            }
        }

        AppError::InternalServerError.into_response()
    }
}

/// Outermost layer: catches panics anywhere downstream.
pub fn layer(config: RecoveryConfig) -> CatchPanicLayer<PanicResponder> {
    if config.log_backtrace {
        install_backtrace_hook();
    }
    CatchPanicLayer::custom(PanicResponder { config })
}

fn panic_message(err: &(dyn Any + Send)) -> &str {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
