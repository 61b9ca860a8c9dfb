//! Overlapping recipe writes against the real service and adapters.
//!
//! A repository wrapper holds one `find` open so an edit can be parked
//! between reading the recipe and writing it back while an upload runs.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use recipe_api::domain::ports::{
    DeletedRecipe, RecipeCommand, RecipeImageStore, RecipeQuery, RecipeRepository,
    RecipeRepositoryError, UuidImageNames,
};
use recipe_api::domain::{
    ImagePath, ImageUpload, NewRecipe, Price, Recipe, RecipeDraft, RecipeFilter, RecipeId,
    RecipePatch, RecipeService, RecipeServicePorts, RecipeTitle, TimeMinutes, UserId,
};
use recipe_api::outbound::media::FsRecipeImageStore;
use recipe_api::outbound::memory::InMemoryPersistence;
use tokio::sync::Notify;

struct HeldAfterFind {
    inner: InMemoryPersistence,
    armed: AtomicBool,
    reached: Notify,
    release: Notify,
}

impl HeldAfterFind {
    fn new(inner: InMemoryPersistence) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            reached: Notify::new(),
            release: Notify::new(),
        }
    }

    fn hold_next_find(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecipeRepository for HeldAfterFind {
    async fn insert(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError> {
        RecipeRepository::insert(&self.inner, recipe).await
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let found = RecipeRepository::find(&self.inner, owner, id).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.release.notified().await;
        }
        found
    }

    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        RecipeRepository::list(&self.inner, owner, filter).await
    }

    async fn update_details(&self, recipe: &Recipe) -> Result<Recipe, RecipeRepositoryError> {
        self.inner.update_details(recipe).await
    }

    async fn set_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &ImagePath,
    ) -> Result<Option<ImagePath>, RecipeRepositoryError> {
        self.inner.set_image(owner, id, image).await
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<DeletedRecipe>, RecipeRepositoryError> {
        RecipeRepository::delete(&self.inner, owner, id).await
    }
}

fn png_upload() -> ImageUpload {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(10, 10))
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encode png");
    ImageUpload {
        bytes: buffer.into_inner(),
        filename: Some("soup.png".to_owned()),
    }
}

#[tokio::test]
async fn edit_overlapping_an_upload_keeps_the_new_image() {
    let media = tempfile::tempdir().expect("media tempdir");
    let images = Arc::new(FsRecipeImageStore::open(media.path()).expect("media root"));
    let store = InMemoryPersistence::new();
    let recipes = Arc::new(HeldAfterFind::new(store.clone()));
    let service = RecipeService::new(RecipeServicePorts {
        recipes: Arc::clone(&recipes),
        taxonomy: Arc::new(store),
        images: Arc::clone(&images),
        names: Arc::new(UuidImageNames),
    });
    let owner = UserId::random();
    let draft = RecipeDraft::new(
        RecipeTitle::new("Soup").expect("title"),
        TimeMinutes::new(5).expect("time"),
        "4.50".parse::<Price>().expect("price"),
    );
    let recipe = service.create(&owner, draft).await.expect("recipe created");

    recipes.hold_next_find();
    let editor = service.clone();
    let recipe_id = recipe.id;
    let edit = tokio::spawn(async move {
        let patch = RecipePatch {
            title: Some(RecipeTitle::new("Stew").expect("title")),
            ..RecipePatch::default()
        };
        editor.update(&owner, recipe_id, patch).await
    });
    recipes.reached.notified().await;

    let uploaded = service
        .upload_image(&owner, recipe.id, png_upload())
        .await
        .expect("upload succeeds");
    let image = uploaded.image.expect("image recorded");

    recipes.release.notify_one();
    let edited = edit
        .await
        .expect("edit task joins")
        .expect("edit succeeds");
    assert_eq!(edited.title.as_ref(), "Stew");
    assert_eq!(edited.image.as_ref(), Some(&image));

    let stored = service.get(&owner, recipe.id).await.expect("recipe loads");
    assert_eq!(stored.image, Some(image.clone()));
    assert!(images.exists(&image).await.expect("blob lookup"));
}

#[tokio::test]
async fn delete_after_an_upload_removes_the_recorded_blob() {
    let media = tempfile::tempdir().expect("media tempdir");
    let images = Arc::new(FsRecipeImageStore::open(media.path()).expect("media root"));
    let store = Arc::new(InMemoryPersistence::new());
    let service = RecipeService::new(RecipeServicePorts {
        recipes: Arc::clone(&store),
        taxonomy: store,
        images: Arc::clone(&images),
        names: Arc::new(UuidImageNames),
    });
    let owner = UserId::random();
    let draft = RecipeDraft::new(
        RecipeTitle::new("Soup").expect("title"),
        TimeMinutes::new(5).expect("time"),
        "4.50".parse::<Price>().expect("price"),
    );
    let recipe = service.create(&owner, draft).await.expect("recipe created");
    let image = service
        .upload_image(&owner, recipe.id, png_upload())
        .await
        .expect("upload succeeds")
        .image
        .expect("image recorded");

    service.delete(&owner, recipe.id).await.expect("delete succeeds");

    assert!(!images.exists(&image).await.expect("blob lookup"));
}
