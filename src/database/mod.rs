use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

use std::error::Error;

pub const USERS: &str = "users";
pub const MEALS: &str = "meals";
pub const UPCOMING_MEALS: &str = "upcomingMeals";
pub const MEAL_REQUESTS: &str = "mealsRequest";
pub const PAYMENTS: &str = "payments";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    /// Connects to MongoDB and prepares the `mealDB` database.
    ///
    /// `eager_ping` controls whether the connection is verified at startup;
    /// serverless deployments skip it and let the first query connect.
    pub async fn new(uri: &str, eager_ping: bool) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database("mealDB");

        let mongodb = Self { client, db };

        // Lazy startups defer every server round trip, index creation
        // included, to the first query
        if eager_ping {
            mongodb.db.run_command(doc! { "ping": 1 }).await?;
            log::info!("✅ Pinged deployment, MongoDB connection confirmed");

            if let Err(e) = mongodb.ensure_indexes().await {
                log::warn!("⚠️ Could not create indexes, continuing without them: {}", e);
            }
        }

        Ok(mongodb)
    }

    /// Creates the indexes the query paths rely on. Text search over meals
    /// and users is undefined without the text indexes.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS);

        // Unique key: one account per email
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let users_text_index = IndexModel::builder()
            .keys(doc! { "username": "text", "email": "text" })
            .build();

        match users.create_index(users_text_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(username, email) text"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let meals = self.collection::<mongodb::bson::Document>(MEALS);

        let meals_text_index = IndexModel::builder()
            .keys(doc! { "title": "text", "description": "text", "ingredients": "text" })
            .build();

        match meals.create_index(meals_text_index).await {
            Ok(_) => log::info!("   ✅ Index created: meals(title, description, ingredients) text"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let meals_category_index = IndexModel::builder()
            .keys(doc! { "category": 1 })
            .build();

        match meals.create_index(meals_category_index).await {
            Ok(_) => log::info!("   ✅ Index created: meals(category)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // One active request per (email, mealId) is checked before insert;
        // this index keeps both that lookup and the per-user listing fast.
        let requests = self.collection::<mongodb::bson::Document>(MEAL_REQUESTS);

        let requests_index = IndexModel::builder()
            .keys(doc! { "email": 1, "mealId": 1 })
            .build();

        match requests.create_index(requests_index).await {
            Ok(_) => log::info!("   ✅ Index created: mealsRequest(email, mealId)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let payments = self.collection::<mongodb::bson::Document>(PAYMENTS);

        let payments_index = IndexModel::builder().keys(doc! { "email": 1 }).build();

        match payments.create_index(payments_index).await {
            Ok(_) => log::info!("   ✅ Index created: payments(email)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_startup_makes_no_server_round_trips() {
        // Nothing listens on this port; construction must still succeed
        // because the lazy path defers ping and index creation
        let db = MongoDB::new("mongodb://127.0.0.1:9", false).await;
        assert!(db.is_ok());
    }
}
