use anyhow::Context as _;
use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands, Script};
use futures::{StreamExt, stream};

use notifydesk_session::{
    RegistryError, SessionId, SessionKey, SessionRecord, SessionRegistry, SessionUpdates,
};

/// Delete KEYS[1] only if its `sessionId` equals ARGV[1], then publish `null`
/// so watchers see the record disappear.
const REMOVE_IF_OWNED: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return 0
end
local ok, record = pcall(cjson.decode, raw)
if not ok or type(record) ~= 'table' or record.sessionId ~= ARGV[1] then
  return 0
end
redis.call('DEL', KEYS[1])
redis.call('PUBLISH', KEYS[1], 'null')
return 1
"#;

/// Session registry on Redis.
///
/// The record lives at `active_sessions:{key}` and every write is published on
/// a channel of the same name. Watching needs a dedicated pub/sub connection,
/// so `client` is kept next to the pool.
#[derive(Clone)]
pub struct RedisSessionRegistry {
    pub pool: Pool,
    pub client: redis::Client,
}

fn session_key(key: &SessionKey) -> String {
    format!("active_sessions:{key}")
}

fn decode_update(payload: &str) -> Result<Option<SessionRecord>, serde_json::Error> {
    serde_json::from_str(payload)
}

impl SessionRegistry for RedisSessionRegistry {
    async fn put(&self, key: &SessionKey, record: &SessionRecord) -> Result<(), RegistryError> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.pool.get().await.context("get redis connection")?;
        let key = session_key(key);
        let (): () = redis::pipe()
            .atomic()
            .set(&key, &json)
            .ignore()
            .publish(&key, &json)
            .ignore()
            .query_async(&mut conn)
            .await
            .context("write session record")?;
        Ok(())
    }

    async fn current(&self, key: &SessionKey) -> Result<Option<SessionRecord>, RegistryError> {
        let mut conn = self.pool.get().await.context("get redis connection")?;
        let raw: Option<String> = conn
            .get(session_key(key))
            .await
            .context("read session record")?;
        Ok(raw.as_deref().map(serde_json::from_str).transpose()?)
    }

    async fn remove_if_owned(
        &self,
        key: &SessionKey,
        session_id: &SessionId,
    ) -> Result<bool, RegistryError> {
        let mut conn = self.pool.get().await.context("get redis connection")?;
        let script = Script::new(REMOVE_IF_OWNED);
        let removed: i64 = script
            .key(session_key(key))
            .arg(session_id.as_str())
            .invoke_async(&mut conn)
            .await
            .context("remove session record")?;
        Ok(removed == 1)
    }

    async fn watch(&self, key: &SessionKey) -> Result<SessionUpdates, RegistryError> {
        let channel = session_key(key);
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .context("open pubsub connection")?;
        pubsub
            .subscribe(&channel)
            .await
            .context("subscribe to session channel")?;

        // Read after subscribing so no write can fall between the two.
        let initial = self.current(key).await?;

        let changes = pubsub.into_on_message().filter_map(move |msg| {
            let update = msg
                .get_payload::<String>()
                .map_err(anyhow::Error::from)
                .and_then(|payload| decode_update(&payload).map_err(anyhow::Error::from));
            let update = match update {
                Ok(update) => Some(update),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed session update");
                    None
                }
            };
            async move { update }
        });

        Ok(stream::once(async move { initial }).chain(changes).boxed())
    }
}
