use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use futures::FutureExt;
use mongodb::bson::{doc, to_bson, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

use super::{DocumentStore, MOTTOS, MOTTO_LIKES, QR_CODES, USERS};
use crate::models::{
    LikeOutcome, LikeReceipt, Motto, Principal, QrCode, UserRecord, SOURCE_SCAN,
};
use crate::utils::error::AppError;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

/// Resultado da transação de criação de motto
enum CreateTxn {
    OwnerHasMotto,
    IdTaken,
    Created,
}

/// Resultado da transação de like
enum LikeTxn {
    MissingMotto,
    Hidden,
    AlreadyLiked(i64),
    Recorded(i64),
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Timeouts
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split_once("://")
            .and_then(|(_, rest)| rest.split_once('/'))
            .and_then(|(_, path)| path.split('?').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("motto_service");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the store relies on for uniqueness and lookups
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        // qr_codes(qrCodeId) UNIQUE - a chave lógica do código impresso
        let qr_index = IndexModel::builder()
            .keys(doc! { "qrCodeId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match self.collection::<Document>(QR_CODES).create_index(qr_index).await {
            Ok(_) => log::info!("   ✅ Index created: qr_codes(qrCodeId) unique"),
            Err(e) => {
                // link_qr_code and insert_qr_code are only atomic with this index
                log::error!("   ❌ Failed to create unique index on qr_codes: {}", e);
                return Err(Box::new(e));
            }
        }

        // motto_likes(mottoId) - auditoria de likes por motto
        let likes_index = IndexModel::builder()
            .keys(doc! { "mottoId": 1 })
            .build();

        match self.collection::<Document>(MOTTO_LIKES).create_index(likes_index).await {
            Ok(_) => log::info!("   ✅ Index created: motto_likes(mottoId)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn users(&self) -> Collection<UserRecord> {
        self.collection(USERS)
    }

    fn mottos(&self) -> Collection<Motto> {
        self.collection(MOTTOS)
    }

    fn likes(&self) -> Collection<LikeReceipt> {
        self.collection(MOTTO_LIKES)
    }

    fn qr_codes(&self) -> Collection<QrCode> {
        self.collection(QR_CODES)
    }
}

fn is_duplicate_key(e: &MongoError) -> bool {
    match *e.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref we)) => we.code == DUPLICATE_KEY,
        ErrorKind::Command(ref ce) => ce.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn timestamp(now: &DateTime<Utc>) -> Result<Bson, AppError> {
    to_bson(now).map_err(AppError::store)
}

#[async_trait]
impl DocumentStore for MongoDB {
    async fn find_user(&self, key: &str) -> Result<Option<UserRecord>, AppError> {
        self.users()
            .find_one(doc! { "_id": key })
            .await
            .map_err(AppError::store)
    }

    async fn insert_user_if_absent(&self, user: UserRecord) -> Result<UserRecord, AppError> {
        let created_at = timestamp(&user.created_at)?;
        let update = doc! {
            "$setOnInsert": {
                "uid": &user.uid,
                "name": user.name.clone(),
                "email": &user.email,
                "image": user.image.clone(),
                "createdAt": created_at,
            }
        };

        let stored = self
            .users()
            .find_one_and_update(doc! { "_id": &user.key }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(AppError::store)?;

        Ok(stored.unwrap_or(user))
    }

    async fn find_motto(&self, id: &str) -> Result<Option<Motto>, AppError> {
        self.mottos()
            .find_one(doc! { "_id": id })
            .await
            .map_err(AppError::store)
    }

    async fn create_motto(&self, owner: UserRecord, motto: Motto) -> Result<(), AppError> {
        let motto_created_at = timestamp(&motto.created_at)?;
        let user_created_at = timestamp(&owner.created_at)?;

        let mut session = self.client.start_session().await.map_err(AppError::store)?;
        let context = (
            self.users(),
            self.mottos(),
            owner,
            motto,
            motto_created_at,
            user_created_at,
        );

        let outcome = session
            .start_transaction()
            .and_run(context, |session, ctx| {
                let (users, mottos, owner, motto, motto_created_at, user_created_at) = ctx;
                async move {
                    if let Some(user) = users
                        .find_one(doc! { "_id": &owner.key })
                        .session(&mut *session)
                        .await?
                    {
                        if user.motto_id.is_some() {
                            return Ok(CreateTxn::OwnerHasMotto);
                        }
                    }

                    if mottos
                        .find_one(doc! { "_id": &motto.id })
                        .session(&mut *session)
                        .await?
                        .is_some()
                    {
                        return Ok(CreateTxn::IdTaken);
                    }

                    mottos.insert_one(&*motto).session(&mut *session).await?;

                    users
                        .update_one(
                            doc! { "_id": &owner.key },
                            doc! {
                                "$set": {
                                    "mottoId": &motto.id,
                                    "mottoCreatedAt": motto_created_at.clone(),
                                },
                                "$setOnInsert": {
                                    "uid": &owner.uid,
                                    "name": owner.name.clone(),
                                    "email": &owner.email,
                                    "image": owner.image.clone(),
                                    "createdAt": user_created_at.clone(),
                                }
                            },
                        )
                        .upsert(true)
                        .session(&mut *session)
                        .await?;

                    Ok(CreateTxn::Created)
                }
                .boxed()
            })
            .await;

        match outcome {
            Ok(CreateTxn::Created) => Ok(()),
            Ok(CreateTxn::OwnerHasMotto) => Err(AppError::motto_already_exists()),
            Ok(CreateTxn::IdTaken) => Err(AppError::IdTaken),
            Err(e) if is_duplicate_key(&e) => Err(AppError::IdTaken),
            Err(e) => Err(AppError::store(e)),
        }
    }

    async fn find_like(&self, motto_id: &str, uid: &str) -> Result<Option<LikeReceipt>, AppError> {
        self.likes()
            .find_one(doc! { "_id": LikeReceipt::key_for(motto_id, uid) })
            .await
            .map_err(AppError::store)
    }

    async fn like_motto(
        &self,
        motto_id: &str,
        liker: &Principal,
        now: DateTime<Utc>,
    ) -> Result<LikeOutcome, AppError> {
        let mut session = self.client.start_session().await.map_err(AppError::store)?;
        let context = (
            self.mottos(),
            self.likes(),
            LikeReceipt::new(motto_id, liker, now),
            liker.clone(),
        );

        // and_run retries on TransientTransactionError
        let outcome = session
            .start_transaction()
            .and_run(context, |session, ctx| {
                let (mottos, likes, receipt, liker) = ctx;
                async move {
                    let Some(motto) = mottos
                        .find_one(doc! { "_id": &receipt.motto_id })
                        .session(&mut *session)
                        .await?
                    else {
                        return Ok(LikeTxn::MissingMotto);
                    };

                    if motto.ensure_visible_to(Some(&*liker)).is_err() {
                        return Ok(LikeTxn::Hidden);
                    }

                    if likes
                        .find_one(doc! { "_id": &receipt.key })
                        .session(&mut *session)
                        .await?
                        .is_some()
                    {
                        return Ok(LikeTxn::AlreadyLiked(motto.like_count));
                    }

                    likes.insert_one(&*receipt).session(&mut *session).await?;

                    let updated = mottos
                        .find_one_and_update(
                            doc! { "_id": &receipt.motto_id },
                            doc! { "$inc": { "likeCount": 1_i64 } },
                        )
                        .return_document(ReturnDocument::After)
                        .session(&mut *session)
                        .await?;

                    Ok(LikeTxn::Recorded(
                        updated.map_or(motto.like_count + 1, |m| m.like_count),
                    ))
                }
                .boxed()
            })
            .await;

        match outcome {
            Ok(LikeTxn::Recorded(like_count)) => Ok(LikeOutcome {
                already_liked: false,
                like_count,
            }),
            Ok(LikeTxn::AlreadyLiked(like_count)) => Ok(LikeOutcome {
                already_liked: true,
                like_count,
            }),
            Ok(LikeTxn::MissingMotto) => Err(AppError::NotFound("Motto".to_string())),
            Ok(LikeTxn::Hidden) => Err(AppError::Private),
            Err(e) if is_duplicate_key(&e) => {
                // Same user raced themselves; the other request recorded the like
                let like_count = self
                    .find_motto(motto_id)
                    .await?
                    .map(|m| m.like_count)
                    .unwrap_or_default();
                Ok(LikeOutcome {
                    already_liked: true,
                    like_count,
                })
            }
            Err(e) => Err(AppError::store(e)),
        }
    }

    async fn find_qr_code(&self, qr_code_id: &str) -> Result<Option<QrCode>, AppError> {
        self.qr_codes()
            .find_one(doc! { "qrCodeId": qr_code_id })
            .await
            .map_err(AppError::store)
    }

    async fn list_qr_codes(&self) -> Result<Vec<QrCode>, AppError> {
        let mut cursor = self
            .qr_codes()
            .find(doc! {})
            .await
            .map_err(AppError::store)?;

        let mut codes = Vec::new();
        while let Some(result) = cursor.next().await {
            codes.push(result.map_err(AppError::store)?);
        }

        Ok(codes)
    }

    async fn insert_qr_code(&self, mut code: QrCode) -> Result<QrCode, AppError> {
        match self.qr_codes().insert_one(&code).await {
            Ok(result) => {
                code.id = result.inserted_id.as_object_id();
                Ok(code)
            }
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyExists(format!(
                "QR code {} already exists",
                code.qr_code_id
            ))),
            Err(e) => Err(AppError::store(e)),
        }
    }

    async fn link_qr_code(
        &self,
        qr_code_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<QrCode, AppError> {
        let linked_at = timestamp(&now)?;

        // Matches only an unlinked record; a linked one makes the upsert collide
        // with the unique qrCodeId index instead of overwriting its email.
        let filter = doc! { "qrCodeId": qr_code_id, "isLinked": false };
        let update = doc! {
            "$set": {
                "isLinked": true,
                "linkedUserEmail": email,
                "linkedAt": linked_at.clone(),
            },
            "$setOnInsert": {
                "createdAt": linked_at,
                "source": SOURCE_SCAN,
            }
        };

        let result = self
            .qr_codes()
            .find_one_and_update(filter, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(Some(code)) => Ok(code),
            Ok(None) => Err(AppError::store("link upsert returned no document")),
            Err(e) if is_duplicate_key(&e) => {
                let linked_to = self
                    .find_qr_code(qr_code_id)
                    .await?
                    .and_then(|c| c.linked_user_email)
                    .unwrap_or_default();
                Err(AppError::AlreadyLinked(linked_to))
            }
            Err(e) => Err(AppError::store(e)),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.database()
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(AppError::store)
    }
}
