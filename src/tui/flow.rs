//! Authentication flow: stored tokens or credentials, optional second factor,
//! then a result message.
//!
//! [`AuthFlow::handle`] never touches the view stack or the backend directly;
//! it returns [`Effect`]s for the app to apply.

use crate::auth::{AuthOutcome, Credentials};

use super::backend::{BackendCommand, BackendResponse};
use super::choice::ChoiceList;
use super::form::AuthForm;
use super::input::Prompt;
use super::msgbox::MessageBox;
use super::view::{UiAction, View};

pub const OTC_PROMPT: &str = "Enter One-Time-Code (OTC)";
pub const CHOOSE_METHOD_TITLE: &str = "Choose desired auth method";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Starting,
    PromptingCredentials,
    Authenticating,
    /// Two-factor announcement shown, waiting for OK.
    TwoFactorRequired,
    ChoosingTwoFactorMethod,
    AwaitingVerificationPrompt,
    EnteringProof,
    CheckingOtc,
    EnteringOtc,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    Start { need_full_auth: bool },
    Ui(UiAction),
    Backend(BackendResponse),
}

#[derive(Debug, Clone)]
pub enum Effect {
    Push(View),
    Pop,
    ReturnToRoot,
    Send(BackendCommand),
    Quit,
}

pub struct AuthFlow {
    state: AuthState,
    /// Labels of the offered two-factor methods.
    methods: Vec<String>,
    method: usize,
    proof: Option<String>,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn wait_box(text: &str) -> View {
    View::MessageBox(MessageBox::new("Please wait", text, false))
}

fn message(title: &str, text: String) -> View {
    View::MessageBox(MessageBox::new(title, text, true))
}

impl AuthFlow {
    pub fn new() -> Self {
        Self {
            state: AuthState::Starting,
            methods: Vec::new(),
            method: 0,
            proof: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Success
    }

    pub fn handle(&mut self, event: FlowEvent) -> Vec<Effect> {
        use AuthState as S;

        match (self.state, event) {
            (S::Starting, FlowEvent::Start { need_full_auth: true }) => {
                self.state = S::PromptingCredentials;
                vec![Effect::Push(View::AuthForm(AuthForm::new()))]
            }
            (S::Starting, FlowEvent::Start { need_full_auth: false }) => self.authenticate(None),

            (S::PromptingCredentials, FlowEvent::Ui(UiAction::SubmitCredentials(creds))) => {
                self.authenticate(Some(creds))
            }
            (S::PromptingCredentials, FlowEvent::Ui(UiAction::CancelLogin)) => vec![Effect::Quit],

            (
                S::Authenticating | S::AwaitingVerificationPrompt | S::CheckingOtc,
                FlowEvent::Backend(BackendResponse::Authenticated(outcome)),
            ) => self.on_outcome(outcome),

            (S::TwoFactorRequired, FlowEvent::Ui(UiAction::Acknowledge)) => {
                self.state = S::ChoosingTwoFactorMethod;
                vec![
                    Effect::Pop,
                    Effect::Push(View::Choice(ChoiceList::new(
                        CHOOSE_METHOD_TITLE,
                        self.methods.clone(),
                    ))),
                ]
            }
            (S::ChoosingTwoFactorMethod, FlowEvent::Ui(UiAction::Choose(index))) => {
                self.state = S::AwaitingVerificationPrompt;
                self.method = index;
                vec![Effect::Send(BackendCommand::VerificationPrompt { index })]
            }
            (
                S::AwaitingVerificationPrompt,
                FlowEvent::Backend(BackendResponse::VerificationPrompt { prompt }),
            ) => match prompt {
                Some(prompt) => {
                    self.state = S::EnteringProof;
                    vec![Effect::Pop, Effect::Push(View::Prompt(Prompt::new(prompt)))]
                }
                None => {
                    let mut effects = vec![Effect::Pop];
                    effects.extend(self.check_otc(None));
                    effects
                }
            },
            (S::EnteringProof, FlowEvent::Ui(UiAction::SubmitInput(proof))) => {
                let mut effects = vec![Effect::Pop];
                effects.extend(self.check_otc(Some(proof)));
                effects
            }
            (S::CheckingOtc, FlowEvent::Backend(BackendResponse::OtcChecked { needs_otc })) => {
                if needs_otc {
                    self.state = S::EnteringOtc;
                    vec![Effect::Pop, Effect::Push(View::Prompt(Prompt::new(OTC_PROMPT)))]
                } else {
                    let mut effects = vec![Effect::Pop];
                    effects.extend(self.complete_two_factor(None));
                    effects
                }
            }
            (S::EnteringOtc, FlowEvent::Ui(UiAction::SubmitInput(otc))) => {
                let mut effects = vec![Effect::Pop];
                effects.extend(self.complete_two_factor(Some(otc)));
                effects
            }
            (
                S::ChoosingTwoFactorMethod | S::EnteringProof | S::EnteringOtc,
                FlowEvent::Ui(UiAction::Cancel),
            ) => self.on_outcome(AuthOutcome::Failed(
                "Two-factor authentication cancelled".to_string(),
            )),

            (S::Success | S::Failed, FlowEvent::Ui(UiAction::Acknowledge)) => vec![Effect::Quit],

            (state, event) => {
                tracing::debug!("Ignoring {:?} in state {:?}", event, state);
                Vec::new()
            }
        }
    }

    fn authenticate(&mut self, credentials: Option<Credentials>) -> Vec<Effect> {
        self.state = AuthState::Authenticating;
        vec![
            Effect::Push(wait_box("Authenticating...\n")),
            Effect::Send(BackendCommand::Authenticate { credentials }),
        ]
    }

    fn check_otc(&mut self, proof: Option<String>) -> Vec<Effect> {
        self.state = AuthState::CheckingOtc;
        self.proof = proof.clone();
        vec![
            Effect::Push(wait_box("Checking verification method...\n")),
            Effect::Send(BackendCommand::CheckOtc {
                index: self.method,
                proof,
            }),
        ]
    }

    fn complete_two_factor(&mut self, otc: Option<String>) -> Vec<Effect> {
        self.state = AuthState::Authenticating;
        vec![
            Effect::Push(wait_box("Waiting for 2FA to complete")),
            Effect::Send(BackendCommand::CompleteTwoFactor {
                index: self.method,
                proof: self.proof.take(),
                otc,
            }),
        ]
    }

    fn on_outcome(&mut self, outcome: AuthOutcome) -> Vec<Effect> {
        match outcome {
            AuthOutcome::Success => {
                self.state = AuthState::Success;
                vec![
                    Effect::ReturnToRoot,
                    Effect::Push(message(
                        "Success",
                        "Authentication was successful, tokens saved!\n".to_string(),
                    )),
                ]
            }
            AuthOutcome::TwoFactorRequired(challenge) => {
                self.state = AuthState::TwoFactorRequired;
                self.methods = challenge.strategies.iter().map(|s| s.label()).collect();
                self.method = 0;
                self.proof = None;
                vec![
                    Effect::ReturnToRoot,
                    Effect::Push(message(
                        "Two-factor authentication",
                        "Two-factor authentication required\n".to_string(),
                    )),
                ]
            }
            AuthOutcome::Failed(reason) => {
                tracing::debug!("Authentication failed, Error: {}", reason);
                self.state = AuthState::Failed;
                vec![
                    Effect::ReturnToRoot,
                    Effect::Push(message(
                        "Error",
                        format!("Authentication failed!\n{}\n", reason),
                    )),
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::challenge;

    /// Compact rendering of effects for assertions.
    fn describe(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .map(|effect| match effect {
                Effect::Push(View::MessageBox(msg)) => format!("push message {}", msg.title),
                Effect::Push(View::Prompt(prompt)) => format!("push prompt {}", prompt.title),
                Effect::Push(View::Choice(list)) => format!("push choice {}", list.entries.join("|")),
                Effect::Push(view) => format!("push {}", view.name()),
                Effect::Pop => "pop".to_string(),
                Effect::ReturnToRoot => "root".to_string(),
                Effect::Send(cmd) => format!("send {:?}", cmd),
                Effect::Quit => "quit".to_string(),
            })
            .collect()
    }

    fn message_text(effects: &[Effect]) -> Option<String> {
        effects.iter().find_map(|effect| match effect {
            Effect::Push(View::MessageBox(msg)) => Some(msg.text.clone()),
            _ => None,
        })
    }

    fn authenticated(outcome: AuthOutcome) -> FlowEvent {
        FlowEvent::Backend(BackendResponse::Authenticated(outcome))
    }

    fn two_factor_flow() -> AuthFlow {
        let mut flow = AuthFlow::new();
        flow.handle(FlowEvent::Start {
            need_full_auth: false,
        });
        flow.handle(authenticated(AuthOutcome::TwoFactorRequired(challenge(&[
            (1, "Email"),
            (2, "Phone"),
        ]))));
        flow
    }

    #[test]
    fn test_start_with_full_auth_shows_form() {
        let mut flow = AuthFlow::new();
        let effects = flow.handle(FlowEvent::Start {
            need_full_auth: true,
        });
        assert_eq!(describe(&effects), vec!["push auth-form"]);
        assert_eq!(flow.state(), AuthState::PromptingCredentials);
    }

    #[test]
    fn test_start_with_stored_tokens_authenticates_silently() {
        let mut flow = AuthFlow::new();
        let effects = flow.handle(FlowEvent::Start {
            need_full_auth: false,
        });
        assert_eq!(
            describe(&effects),
            vec![
                "push message Please wait".to_string(),
                "send Authenticate { credentials: None }".to_string(),
            ]
        );
        assert_eq!(message_text(&effects).as_deref(), Some("Authenticating...\n"));
        assert_eq!(flow.state(), AuthState::Authenticating);
    }

    #[test]
    fn test_submit_credentials_sends_them() {
        let mut flow = AuthFlow::new();
        flow.handle(FlowEvent::Start {
            need_full_auth: true,
        });
        let creds = Credentials::new("a@b.c", "pw");
        let effects = flow.handle(FlowEvent::Ui(UiAction::SubmitCredentials(creds.clone())));

        assert!(matches!(
            &effects[1],
            Effect::Send(BackendCommand::Authenticate { credentials: Some(c) }) if *c == creds
        ));
    }

    #[test]
    fn test_cancel_quits() {
        let mut flow = AuthFlow::new();
        flow.handle(FlowEvent::Start {
            need_full_auth: true,
        });
        let effects = flow.handle(FlowEvent::Ui(UiAction::CancelLogin));
        assert_eq!(describe(&effects), vec!["quit"]);
    }

    #[test]
    fn test_success_message_then_ok_quits() {
        let mut flow = AuthFlow::new();
        flow.handle(FlowEvent::Start {
            need_full_auth: false,
        });
        let effects = flow.handle(authenticated(AuthOutcome::Success));

        assert_eq!(describe(&effects), vec!["root", "push message Success"]);
        assert_eq!(
            message_text(&effects).as_deref(),
            Some("Authentication was successful, tokens saved!\n")
        );
        assert!(flow.is_authenticated());

        let effects = flow.handle(FlowEvent::Ui(UiAction::Acknowledge));
        assert_eq!(describe(&effects), vec!["quit"]);
    }

    #[test]
    fn test_failure_message_includes_reason() {
        let mut flow = AuthFlow::new();
        flow.handle(FlowEvent::Start {
            need_full_auth: false,
        });
        let effects = flow.handle(authenticated(AuthOutcome::Failed("bad password".to_string())));

        assert_eq!(describe(&effects), vec!["root", "push message Error"]);
        assert_eq!(
            message_text(&effects).as_deref(),
            Some("Authentication failed!\nbad password\n")
        );
        assert_eq!(flow.state(), AuthState::Failed);
        assert!(!flow.is_authenticated());
    }

    #[test]
    fn test_two_factor_lists_methods_in_order() {
        let mut flow = two_factor_flow();
        assert_eq!(flow.state(), AuthState::TwoFactorRequired);

        let effects = flow.handle(FlowEvent::Ui(UiAction::Acknowledge));
        assert_eq!(
            describe(&effects),
            vec!["pop", "push choice Email, Name: Email|SMS, Name: Phone"]
        );
    }

    #[test]
    fn test_two_factor_full_round_trip() {
        let mut flow = two_factor_flow();
        flow.handle(FlowEvent::Ui(UiAction::Acknowledge));

        let effects = flow.handle(FlowEvent::Ui(UiAction::Choose(1)));
        assert_eq!(
            describe(&effects),
            vec!["send VerificationPrompt { index: 1 }"]
        );

        let effects = flow.handle(FlowEvent::Backend(BackendResponse::VerificationPrompt {
            prompt: Some("Enter the last 4 digits".to_string()),
        }));
        assert_eq!(
            describe(&effects),
            vec!["pop", "push prompt Enter the last 4 digits"]
        );

        let effects = flow.handle(FlowEvent::Ui(UiAction::SubmitInput("1234".to_string())));
        assert_eq!(effects.len(), 3);
        assert!(matches!(
            &effects[2],
            Effect::Send(BackendCommand::CheckOtc { index: 1, proof: Some(p) }) if p == "1234"
        ));

        let effects = flow.handle(FlowEvent::Backend(BackendResponse::OtcChecked {
            needs_otc: true,
        }));
        assert_eq!(describe(&effects), vec!["pop", "push prompt Enter One-Time-Code (OTC)"]);

        let effects = flow.handle(FlowEvent::Ui(UiAction::SubmitInput("654321".to_string())));
        assert_eq!(
            message_text(&effects).as_deref(),
            Some("Waiting for 2FA to complete")
        );
        assert!(matches!(
            &effects[2],
            Effect::Send(BackendCommand::CompleteTwoFactor {
                index: 1,
                proof: Some(p),
                otc: Some(o),
            }) if p == "1234" && o == "654321"
        ));
        assert_eq!(flow.state(), AuthState::Authenticating);

        flow.handle(authenticated(AuthOutcome::Success));
        assert!(flow.is_authenticated());
    }

    #[test]
    fn test_two_factor_without_prompt_or_otc() {
        let mut flow = two_factor_flow();
        flow.handle(FlowEvent::Ui(UiAction::Acknowledge));
        flow.handle(FlowEvent::Ui(UiAction::Choose(0)));

        let effects = flow.handle(FlowEvent::Backend(BackendResponse::VerificationPrompt {
            prompt: None,
        }));
        assert!(matches!(
            &effects[2],
            Effect::Send(BackendCommand::CheckOtc { index: 0, proof: None })
        ));

        let effects = flow.handle(FlowEvent::Backend(BackendResponse::OtcChecked {
            needs_otc: false,
        }));
        assert!(matches!(
            &effects[2],
            Effect::Send(BackendCommand::CompleteTwoFactor {
                index: 0,
                proof: None,
                otc: None,
            })
        ));
    }

    #[test]
    fn test_escape_cancels_two_factor() {
        let mut flow = two_factor_flow();
        flow.handle(FlowEvent::Ui(UiAction::Acknowledge));

        let effects = flow.handle(FlowEvent::Ui(UiAction::Cancel));
        assert_eq!(
            message_text(&effects).as_deref(),
            Some("Authentication failed!\nTwo-factor authentication cancelled\n")
        );
        assert_eq!(flow.state(), AuthState::Failed);
    }

    #[test]
    fn test_backend_failure_during_otc_check() {
        let mut flow = two_factor_flow();
        flow.handle(FlowEvent::Ui(UiAction::Acknowledge));
        flow.handle(FlowEvent::Ui(UiAction::Choose(0)));
        flow.handle(FlowEvent::Backend(BackendResponse::VerificationPrompt {
            prompt: None,
        }));

        let effects = flow.handle(authenticated(AuthOutcome::Failed("timeout".to_string())));
        assert_eq!(describe(&effects), vec!["root", "push message Error"]);
    }

    #[test]
    fn test_out_of_state_events_are_ignored() {
        let mut flow = AuthFlow::new();
        assert!(flow
            .handle(FlowEvent::Ui(UiAction::Acknowledge))
            .is_empty());
        assert!(flow
            .handle(authenticated(AuthOutcome::Success))
            .is_empty());
        assert_eq!(flow.state(), AuthState::Starting);

        flow.handle(FlowEvent::Start {
            need_full_auth: true,
        });
        assert!(flow
            .handle(FlowEvent::Start {
                need_full_auth: true
            })
            .is_empty());
        assert_eq!(flow.state(), AuthState::PromptingCredentials);
    }
}
