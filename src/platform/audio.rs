//! Clip playback backends

#[cfg(not(target_arch = "wasm32"))]
pub use native::TerminalBell;
#[cfg(target_arch = "wasm32")]
pub use web::WebClips;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::HtmlAudioElement;

    use crate::audio::{AudioError, Clip, ClipBackend, Readiness};

    /// `<audio>` elements loaded from the clip paths
    #[derive(Default)]
    pub struct WebClips {
        elements: Vec<(Clip, HtmlAudioElement)>,
    }

    impl WebClips {
        pub fn new() -> Self {
            Self::default()
        }

        fn element(&self, clip: Clip) -> Option<&HtmlAudioElement> {
            self.elements
                .iter()
                .find(|(c, _)| *c == clip)
                .map(|(_, el)| el)
        }
    }

    impl ClipBackend for WebClips {
        fn preload(&mut self, clip: Clip, readiness: Readiness) {
            let audio = match HtmlAudioElement::new_with_src(clip.path()) {
                Ok(audio) => audio,
                Err(err) => {
                    log::warn!("Failed to create audio element: {:?}", err);
                    readiness.failed(clip);
                    return;
                }
            };
            audio.set_preload("auto");

            // Readiness settles once, so repeated events are harmless
            {
                let readiness = readiness.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    readiness.loaded(clip);
                });
                let _ = audio.add_event_listener_with_callback(
                    "canplaythrough",
                    closure.as_ref().unchecked_ref(),
                );
                closure.forget();
            }
            {
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    readiness.failed(clip);
                });
                let _ = audio
                    .add_event_listener_with_callback("error", closure.as_ref().unchecked_ref());
                closure.forget();
            }

            audio.load();
            self.elements.push((clip, audio));
        }

        fn play(&self, clip: Clip) -> Result<(), AudioError> {
            let audio = self.element(clip).ok_or(AudioError::Unavailable(clip))?;
            audio.set_current_time(0.0);
            let promise = audio
                .play()
                .map_err(|err| AudioError::Playback(format!("{:?}", err)))?;

            // Autoplay policy rejections arrive asynchronously
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    log::warn!("Error playing sound: {:?}", err);
                }
            });
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::Write;

    use crate::audio::{AudioError, Clip, ClipBackend, Readiness};

    /// Rings the terminal bell on wrong answers; correct answers stay quiet
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TerminalBell;

    impl ClipBackend for TerminalBell {
        fn preload(&mut self, clip: Clip, readiness: Readiness) {
            readiness.loaded(clip);
        }

        fn play(&self, clip: Clip) -> Result<(), AudioError> {
            if clip == Clip::Correct {
                return Ok(());
            }
            let mut stderr = std::io::stderr();
            stderr
                .write_all(b"\x07")
                .and_then(|_| stderr.flush())
                .map_err(|err| AudioError::Playback(err.to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::audio::{AnswerSound, AudioNotifier};

        #[test]
        fn test_ready_immediately() {
            let notifier = AudioNotifier::new(TerminalBell);
            assert!(notifier.is_ready());
            notifier.notify(true);
        }
    }
}
