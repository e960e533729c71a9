use crate::error::{BridgeError, Result};
use crate::schema::{DbusSignal, SignalSchema};
use crate::table::{BusScope, SignalRoute};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use gitevent_core::EventKind;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use zbus::names::BusName;
use zbus::{Connection, MatchRule, Message, MessageStream};

pub type SignalStream = BoxStream<'static, Result<DbusSignal>>;

/// The bus the bridge talks to.
#[async_trait]
pub trait SignalTransport: Send + Sync {
    async fn publish(&self, route: &SignalRoute, signal: &DbusSignal) -> Result<()>;

    /// One stream carrying the signals of every given route, in arrival order.
    async fn subscribe(&self, routes: &[SignalRoute]) -> Result<SignalStream>;
}

/// [`SignalTransport`] over the system bus, connected on first use.
#[derive(Default)]
pub struct ZbusTransport {
    system: OnceCell<Connection>,
}

impl ZbusTransport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn connection(&self, scope: BusScope) -> Result<&Connection> {
        let connection = match scope {
            BusScope::System => {
                self.system
                    .get_or_try_init(|| async {
                        info!("Connecting to the system bus");
                        Connection::system().await
                    })
                    .await?
            }
        };
        Ok(connection)
    }
}

async fn emit<S: SignalSchema>(
    connection: &Connection,
    route: &SignalRoute,
    body: &S,
) -> Result<()> {
    connection
        .emit_signal(
            None::<BusName<'static>>,
            route.path,
            route.interface,
            route.member,
            body,
        )
        .await?;
    Ok(())
}

fn decode(kind: EventKind, message: &Message) -> Result<DbusSignal> {
    let body = message.body();
    let signal = match kind {
        EventKind::StagedChangesCommitted => DbusSignal::StagedChangesCommitted(body.deserialize()?),
        EventKind::CommittedChangesPushed => DbusSignal::CommittedChangesPushed(body.deserialize()?),
        EventKind::CommittedChangesTagged => DbusSignal::CommittedChangesTagged(body.deserialize()?),
        EventKind::TagPushed => DbusSignal::TagPushed(body.deserialize()?),
        EventKind::DockerImageRequested => DbusSignal::DockerImageRequested(body.deserialize()?),
        EventKind::DockerImageAvailable => DbusSignal::DockerImageAvailable(body.deserialize()?),
        EventKind::DockerImagePushed => DbusSignal::DockerImagePushed(body.deserialize()?),
        other => return Err(BridgeError::UnknownSignal(other.qualified_name())),
    };
    Ok(signal)
}

#[async_trait]
impl SignalTransport for ZbusTransport {
    async fn publish(&self, route: &SignalRoute, signal: &DbusSignal) -> Result<()> {
        let connection = self.connection(route.scope).await?;
        debug!("Emitting {}.{} on {}", route.interface, route.member, route.path);

        match signal {
            DbusSignal::StagedChangesCommitted(body) => emit(connection, route, body).await,
            DbusSignal::CommittedChangesPushed(body) => emit(connection, route, body).await,
            DbusSignal::CommittedChangesTagged(body) => emit(connection, route, body).await,
            DbusSignal::TagPushed(body) => emit(connection, route, body).await,
            DbusSignal::DockerImageRequested(body) => emit(connection, route, body).await,
            DbusSignal::DockerImageAvailable(body) => emit(connection, route, body).await,
            DbusSignal::DockerImagePushed(body) => emit(connection, route, body).await,
        }
    }

    async fn subscribe(&self, routes: &[SignalRoute]) -> Result<SignalStream> {
        let mut streams = Vec::with_capacity(routes.len());

        for route in routes {
            let connection = self.connection(route.scope).await?;
            let rule = MatchRule::builder()
                .msg_type(zbus::message::Type::Signal)
                .interface(route.interface)?
                .member(route.member)?
                .path(route.path)?
                .build();
            let messages = MessageStream::for_match_rule(rule, connection, None).await?;
            info!("Subscribed to {}.{}", route.interface, route.member);

            let kind = route.kind;
            streams.push(
                messages
                    .map(move |message| decode(kind, &message?))
                    .boxed(),
            );
        }

        Ok(stream::select_all(streams).boxed())
    }
}
