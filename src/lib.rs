pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ChatSession, CompletionClient, DismissLandingUseCase, MessageRepository, PendingTurn,
    SubmitMessageUseCase, TurnOutcome, COMPLETION_FAILURE_MESSAGE, DEFAULT_LANDING_DELAY,
    INTRO_MESSAGE,
};

pub use cli::Commands;

pub use connector::{
    ChatHttpServer, Container, ContainerConfig, GeminiClient, InMemoryMessageRepository,
    MockCompletionClient, Router,
};

pub use domain::{DomainError, Message, MessageId, Sender, SessionSnapshot, SessionState};
