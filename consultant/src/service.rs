//! Consultant service: start, message, end, register, login and product lookup.
//!
//! Every call takes the client's opaque session token and returns the token the client
//! should hold afterwards, so a front-end only has to store one string per conversation.

use llm_gateway::{LlmGateway, MessageRole};
use std::sync::Arc;
use storage::SessionRecord;
use tracing::{error, info, instrument, warn};

use crate::context::ContextBuilder;
use crate::core::{ConsultantError, Result};
use crate::products::{ProductDetailSource, ProductDocument};
use crate::reaper::Compactor;
use crate::session::{Credentials, SessionLocks, SessionStore};

/// User-facing texts.
pub mod replies {
    pub const GREETING: &str = "Здравствуйте! Я консультант магазина электроники RADAT. \
Задайте вопрос о товаре, и я постараюсь помочь.";
    /// Returned instead of any internal error on a failed live question.
    pub const APOLOGY: &str = "Консультант не может помочь с этим вопросом, пожалуйста, обратитесь к технической поддержке через /help";
    pub const ALREADY_REGISTERED: &str = "Пользователь с такими данными уже зарегистрирован";
    pub const USER_NOT_FOUND: &str =
        "Пользователя с такими данными не существует. Сначала завершите регистрацию";
    pub const INVALID_CREDENTIALS: &str =
        "Укажите логин и пароль: /register <логин> <пароль> или /login <логин> <пароль>";
    pub const REGISTERED: &str = "Вы успешно зарегистрировались и вошли в аккаунт";
    pub const LOGGED_IN: &str = "Вы успешно вошли в систему";
    pub const SESSION_ENDED: &str =
        "Спасибо, что воспользовались нашим консультантом. Пожалуйста, оцените сессию";
    pub const NO_RUNNING_SESSION: &str = "У вас нет никаких запущенных сессий";
    pub const PRODUCT_NOT_FOUND: &str = "Товар не найден";
    pub const START_FIRST: &str = "Чтобы начать консультацию, отправьте /start";
    pub const TECHNICAL_ISSUES: &str =
        "Возникли технические неполадки, пожалуйста, попробуйте позже";
    pub const HELP: &str = "Я консультант магазина электроники RADAT.\n\
/start - начать консультацию\n\
/end - завершить консультацию\n\
/register <логин> <пароль> - зарегистрироваться и сохранить историю\n\
/login <логин> <пароль> - войти в аккаунт\n\
/product <номер> - выбрать товар для вопросов\n\
/help - эта справка\n\
Любое другое сообщение - вопрос консультанту.";
}

/// Session identity handed back to the client. An empty token means "no session".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub token: String,
    pub is_registered: bool,
}

impl SessionHandle {
    pub fn none() -> Self {
        Self {
            token: String::new(),
            is_registered: false,
        }
    }

    pub fn is_none(&self) -> bool {
        self.token.is_empty()
    }
}

impl From<&SessionRecord> for SessionHandle {
    fn from(session: &SessionRecord) -> Self {
        Self {
            token: session.id.clone(),
            is_registered: session.is_registered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    pub session: SessionHandle,
    pub text: String,
}

impl ServiceReply {
    fn new(session: SessionHandle, text: impl Into<String>) -> Self {
        Self {
            session,
            text: text.into(),
        }
    }
}

pub struct ConsultantService {
    sessions: SessionStore,
    context: ContextBuilder,
    gateway: Arc<dyn LlmGateway>,
    compactor: Compactor,
    locks: Arc<SessionLocks>,
    products: Arc<dyn ProductDetailSource>,
}

impl ConsultantService {
    pub fn new(
        sessions: SessionStore,
        context: ContextBuilder,
        gateway: Arc<dyn LlmGateway>,
        locks: Arc<SessionLocks>,
        products: Arc<dyn ProductDetailSource>,
    ) -> Self {
        let compactor = Compactor::new(sessions.clone(), gateway.clone());
        Self {
            sessions,
            context,
            gateway,
            compactor,
            locks,
            products,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Resolves (or creates) the session and marks it active.
    #[instrument(skip(self))]
    pub async fn start(&self, token: Option<&str>) -> Result<ServiceReply> {
        let session = self.sessions.resolve(token).await?;
        self.sessions.touch(&session.id).await;
        Ok(ServiceReply::new((&session).into(), replies::GREETING))
    }

    /// Answers a live question. On gateway failure the turn is not stored and the
    /// apology is returned; activity is recorded either way.
    #[instrument(skip(self, text))]
    pub async fn message(
        &self,
        token: Option<&str>,
        text: &str,
        product_id: Option<&str>,
    ) -> Result<ServiceReply> {
        let resolved = self.sessions.resolve(token).await?;
        let _guard = self.locks.lock(&resolved.id).await;
        // The reaper may have evicted the session while we waited for the lock.
        let session = match self.sessions.get(&resolved.id).await {
            Err(ConsultantError::SessionNotFound(_)) => self.sessions.resolve(None).await?,
            other => other?,
        };
        let handle = SessionHandle::from(&session);

        let prompt = format!("{}{}", self.context.build(&session.id, product_id).await, text);

        let reply = match self.gateway.complete(&prompt, MessageRole::User).await {
            Ok(answer) => {
                self.sessions
                    .storage()
                    .messages
                    .append(&session.id, text, &answer)
                    .await?;
                answer
            }
            Err(e) => {
                error!(error = %e, session_id = %session.id, "Consultant failed to answer");
                replies::APOLOGY.to_string()
            }
        };

        self.sessions.touch(&session.id).await;
        Ok(ServiceReply::new(handle, reply))
    }

    /// Ends the session: anonymous ones are deleted, registered ones are compacted now and
    /// marked expired. The returned handle is empty.
    #[instrument(skip(self))]
    pub async fn end(&self, token: Option<&str>) -> Result<ServiceReply> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(ServiceReply::new(SessionHandle::none(), replies::NO_RUNNING_SESSION));
        };
        let session = match self.sessions.get(token).await {
            Ok(session) => session,
            Err(ConsultantError::SessionNotFound(_)) => {
                return Ok(ServiceReply::new(SessionHandle::none(), replies::NO_RUNNING_SESSION));
            }
            Err(e) => return Err(e),
        };

        let _guard = self.locks.lock(&session.id).await;
        if session.is_registered {
            if let Err(e) = self.compactor.compact(&session.id).await {
                warn!(error = %e, session_id = %session.id, "Compaction on end failed; reaper will retry");
            }
            self.sessions.expire(&session.id).await?;
            info!(session_id = %session.id, "Registered session ended");
        } else {
            self.sessions.discard(&session.id).await?;
            info!(session_id = %session.id, "Anonymous session ended");
        }

        Ok(ServiceReply::new(SessionHandle::none(), replies::SESSION_ENDED))
    }

    /// Registers a new user from the current anonymous session, carrying its history over.
    #[instrument(skip(self, credentials))]
    pub async fn register(
        &self,
        token: Option<&str>,
        credentials: &Credentials,
    ) -> Result<ServiceReply> {
        let current = self.sessions.resolve(token).await?;
        if current.is_registered {
            return Ok(ServiceReply::new(
                (&current).into(),
                replies::ALREADY_REGISTERED,
            ));
        }

        let _guard = self.locks.lock(&current.id).await;
        match self.sessions.promote(&current.id, credentials).await {
            Ok(session) => Ok(ServiceReply::new((&session).into(), replies::REGISTERED)),
            Err(e) => match domain_reply(&e) {
                Some(text) => {
                    info!(error = %e, "Registration refused");
                    Ok(ServiceReply::new((&current).into(), text))
                }
                None => Err(e),
            },
        }
    }

    /// Logs in; an anonymous session held by the token is discarded.
    #[instrument(skip(self, credentials))]
    pub async fn login(
        &self,
        token: Option<&str>,
        credentials: &Credentials,
    ) -> Result<ServiceReply> {
        let session = match self.sessions.authenticate(credentials).await {
            Ok(session) => session,
            Err(e) => {
                return match domain_reply(&e) {
                    Some(text) => {
                        info!(error = %e, "Login refused");
                        let handle = self.current_handle(token).await;
                        Ok(ServiceReply::new(handle, text))
                    }
                    None => Err(e),
                };
            }
        };

        if let Some(old) = token.map(str::trim).filter(|t| !t.is_empty() && *t != session.id) {
            match self.sessions.storage().sessions.find(old).await {
                Ok(Some(previous)) if !previous.is_registered => {
                    let _guard = self.locks.lock(old).await;
                    if let Err(e) = self.sessions.discard(old).await {
                        error!(error = %e, session_id = %old, "Failed to discard anonymous session");
                    }
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, session_id = %old, "Failed to look up previous session"),
            }
        }

        Ok(ServiceReply::new((&session).into(), replies::LOGGED_IN))
    }

    /// Product document for `product_id`, if the source has one.
    pub async fn product(&self, product_id: &str) -> Result<Option<ProductDocument>> {
        self.products.fetch(product_id).await
    }

    async fn current_handle(&self, token: Option<&str>) -> SessionHandle {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return SessionHandle::none();
        };
        match self.sessions.get(token).await {
            Ok(session) => (&session).into(),
            Err(_) => SessionHandle::none(),
        }
    }
}

/// Fixed text for the session domain errors; `None` for infrastructure errors.
pub fn domain_reply(err: &ConsultantError) -> Option<&'static str> {
    match err {
        ConsultantError::AlreadyRegistered(_) => Some(replies::ALREADY_REGISTERED),
        ConsultantError::UserNotFound(_) => Some(replies::USER_NOT_FOUND),
        ConsultantError::InvalidCredentials(_) => Some(replies::INVALID_CREDENTIALS),
        _ => None,
    }
}
