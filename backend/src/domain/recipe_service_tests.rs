//! Tests for the recipe service.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use super::*;
use crate::domain::ports::{
    DeletedRecipe, MockImageNameGenerator, MockRecipeImageStore, MockRecipeRepository,
    MockTaxonomyRepository,
};
use crate::domain::{ErrorCode, Price, RecipeTitle, TimeMinutes};
use image::{DynamicImage, ImageFormat, RgbImage};
use rstest::{fixture, rstest};

#[derive(Default)]
struct Mocks {
    recipes: MockRecipeRepository,
    taxonomy: MockTaxonomyRepository,
    images: MockRecipeImageStore,
}

impl Mocks {
    fn into_service(
        self,
    ) -> RecipeService<MockRecipeRepository, MockTaxonomyRepository, MockRecipeImageStore> {
        let mut names = MockImageNameGenerator::new();
        names.expect_next_name().return_const("test-uuid".to_owned());
        RecipeService::new(RecipeServicePorts {
            recipes: Arc::new(self.recipes),
            taxonomy: Arc::new(self.taxonomy),
            images: Arc::new(self.images),
            names: Arc::new(names),
        })
    }
}

#[fixture]
fn owner() -> UserId {
    UserId::random()
}

fn tag(owner: UserId, id: i64) -> Tag {
    Tag {
        id: TagId::new(id),
        owner,
        name: format!("tag {id}"),
    }
}

fn sample_recipe(owner: UserId) -> Recipe {
    Recipe {
        id: RecipeId::new(7),
        owner,
        title: RecipeTitle::new("Sample recipe").expect("valid title"),
        time_minutes: TimeMinutes::new(10).expect("valid time"),
        price: Price::from_cents(500).expect("valid price"),
        tags: vec![tag(owner, 1)],
        ingredients: Vec::new(),
        image: None,
    }
}

fn draft() -> RecipeDraft {
    RecipeDraft::new(
        RecipeTitle::new("Spaghetti carbonara").expect("valid title"),
        TimeMinutes::new(25).expect("valid time"),
        Price::from_cents(500).expect("valid price"),
    )
}

fn jpeg_bytes() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(10, 10))
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .expect("encode jpeg");
    buffer.into_inner()
}

fn owned_tags_returning_only(mocks: &mut Mocks, known: &'static [i64]) {
    mocks
        .taxonomy
        .expect_find_owned_tags()
        .returning(move |owner, ids| {
            Ok(ids
                .iter()
                .filter(|id| known.contains(&id.get()))
                .map(|id| tag(*owner, id.get()))
                .collect())
        });
}

#[rstest]
#[tokio::test]
async fn create_links_the_requested_tags(owner: UserId) {
    let mut mocks = Mocks::default();
    owned_tags_returning_only(&mut mocks, &[1, 2]);
    mocks.recipes.expect_insert().times(1).returning(|new| {
        Ok(Recipe {
            id: RecipeId::new(1),
            owner: new.owner,
            title: new.title.clone(),
            time_minutes: new.time_minutes,
            price: new.price,
            tags: new.tags.clone(),
            ingredients: new.ingredients.clone(),
            image: None,
        })
    });
    let service = mocks.into_service();

    let recipe = service
        .create(&owner, draft().with_tags([TagId::new(2), TagId::new(1), TagId::new(2)]))
        .await
        .expect("recipe created");

    assert_eq!(
        recipe.tag_ids(),
        BTreeSet::from([TagId::new(1), TagId::new(2)])
    );
    assert_eq!(recipe.tags.len(), 2);
}

#[rstest]
#[tokio::test]
async fn create_rejects_tags_the_user_does_not_own(owner: UserId) {
    let mut mocks = Mocks::default();
    owned_tags_returning_only(&mut mocks, &[1]);
    mocks.recipes.expect_insert().times(0);
    let service = mocks.into_service();

    let err = service
        .create(&owner, draft().with_tags([TagId::new(1), TagId::new(99)]))
        .await
        .expect_err("must fail");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["field"], "tags");
    assert_eq!(details["code"], "unknown_tag");
    assert_eq!(details["ids"], json!([99]));
}

#[rstest]
#[tokio::test]
async fn partial_update_replaces_the_tag_set(owner: UserId) {
    let mut mocks = Mocks::default();
    let existing = sample_recipe(owner);
    mocks
        .recipes
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    owned_tags_returning_only(&mut mocks, &[2]);
    mocks
        .recipes
        .expect_update_details()
        .withf(|recipe| recipe.tag_ids() == BTreeSet::from([TagId::new(2)]))
        .times(1)
        .returning(|recipe| Ok(recipe.clone()));
    let service = mocks.into_service();

    let patch = RecipePatch {
        tags: Some(vec![TagId::new(2)]),
        ..RecipePatch::default()
    };
    let updated = service
        .update(&owner, RecipeId::new(7), patch)
        .await
        .expect("update succeeds");

    assert_eq!(updated.tag_ids(), BTreeSet::from([TagId::new(2)]));
    assert_eq!(updated.title.as_ref(), "Sample recipe");
}

#[rstest]
#[tokio::test]
async fn full_update_without_tags_clears_them(owner: UserId) {
    let mut mocks = Mocks::default();
    let existing = sample_recipe(owner);
    mocks
        .recipes
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    mocks.taxonomy.expect_find_owned_tags().times(0);
    mocks
        .recipes
        .expect_update_details()
        .withf(|recipe| recipe.tags.is_empty())
        .times(1)
        .returning(|recipe| Ok(recipe.clone()));
    let service = mocks.into_service();

    let updated = service
        .update(&owner, RecipeId::new(7), RecipePatch::from(draft()))
        .await
        .expect("update succeeds");

    assert!(updated.tags.is_empty());
    assert_eq!(updated.title.as_ref(), "Spaghetti carbonara");
    assert_eq!(updated.time_minutes.get(), 25);
}

#[rstest]
#[tokio::test]
async fn missing_recipes_are_not_found(owner: UserId) {
    let mut mocks = Mocks::default();
    mocks.recipes.expect_find().returning(|_, _| Ok(None));
    let service = mocks.into_service();

    let err = service
        .get(&owner, RecipeId::new(1))
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn upload_stores_the_image_and_replaces_the_previous_one(owner: UserId) {
    let mut mocks = Mocks::default();
    let mut existing = sample_recipe(owner);
    existing.image = Some(ImagePath::from_stored("uploads/recipe/stale.png".to_owned()));
    mocks
        .recipes
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    mocks
        .images
        .expect_store()
        .withf(|path, bytes| path.as_str() == "uploads/recipe/test-uuid.jpg" && !bytes.is_empty())
        .times(1)
        .returning(|_, _| Ok(()));
    mocks
        .recipes
        .expect_set_image()
        .withf(|_, id, image| {
            *id == RecipeId::new(7) && image.as_str() == "uploads/recipe/test-uuid.jpg"
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(Some(ImagePath::from_stored(
                "uploads/recipe/old.png".to_owned(),
            )))
        });
    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&removed);
    mocks.images.expect_remove().returning(move |path| {
        sink.lock().expect("sink lock").push(path.as_str().to_owned());
        Ok(())
    });
    let service = mocks.into_service();

    let upload = ImageUpload {
        bytes: jpeg_bytes(),
        filename: Some("myimage.jpg".to_owned()),
    };
    let recipe = service
        .upload_image(&owner, RecipeId::new(7), upload)
        .await
        .expect("upload succeeds");

    assert_eq!(
        recipe.image.as_ref().map(ImagePath::as_str),
        Some("uploads/recipe/test-uuid.jpg")
    );
    assert_eq!(
        *removed.lock().expect("removed lock"),
        vec!["uploads/recipe/old.png".to_owned()]
    );
}

#[rstest]
#[tokio::test]
async fn upload_without_filename_uses_detected_extension(owner: UserId) {
    let mut mocks = Mocks::default();
    let existing = sample_recipe(owner);
    mocks
        .recipes
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    mocks
        .images
        .expect_store()
        .withf(|path, _| path.as_str() == "uploads/recipe/test-uuid.jpg")
        .times(1)
        .returning(|_, _| Ok(()));
    mocks.recipes.expect_set_image().returning(|_, _, _| Ok(None));
    let service = mocks.into_service();

    let upload = ImageUpload {
        bytes: jpeg_bytes(),
        filename: None,
    };
    service
        .upload_image(&owner, RecipeId::new(7), upload)
        .await
        .expect("upload succeeds");
}

#[rstest]
#[tokio::test]
async fn non_image_uploads_are_rejected_before_storage(owner: UserId) {
    let mut mocks = Mocks::default();
    let existing = sample_recipe(owner);
    mocks
        .recipes
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    mocks.images.expect_store().times(0);
    mocks.recipes.expect_set_image().times(0);
    let service = mocks.into_service();

    let upload = ImageUpload {
        bytes: b"notimage".to_vec(),
        filename: Some("notimage.txt".to_owned()),
    };
    let err = service
        .upload_image(&owner, RecipeId::new(7), upload)
        .await
        .expect_err("must fail");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["field"], "image");
}

#[rstest]
#[tokio::test]
async fn failed_recording_removes_the_new_blob(owner: UserId) {
    let mut mocks = Mocks::default();
    let existing = sample_recipe(owner);
    mocks
        .recipes
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    mocks.images.expect_store().returning(|_, _| Ok(()));
    mocks
        .recipes
        .expect_set_image()
        .returning(|_, _, _| Err(RecipeRepositoryError::query("write failed")));
    mocks
        .images
        .expect_remove()
        .withf(|path| path.as_str() == "uploads/recipe/test-uuid.jpg")
        .times(1)
        .returning(|_| Ok(()));
    let service = mocks.into_service();

    let upload = ImageUpload {
        bytes: jpeg_bytes(),
        filename: Some("myimage.jpg".to_owned()),
    };
    let err = service
        .upload_image(&owner, RecipeId::new(7), upload)
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn delete_removes_the_stored_image(owner: UserId) {
    let mut mocks = Mocks::default();
    mocks.recipes.expect_find().times(0);
    mocks.recipes.expect_delete().times(1).returning(|_, _| {
        Ok(Some(DeletedRecipe {
            image: Some(ImagePath::from_stored(
                "uploads/recipe/test-uuid.jpg".to_owned(),
            )),
        }))
    });
    mocks
        .images
        .expect_remove()
        .withf(|path| path.as_str() == "uploads/recipe/test-uuid.jpg")
        .times(1)
        .returning(|_| Ok(()));
    let service = mocks.into_service();

    service
        .delete(&owner, RecipeId::new(7))
        .await
        .expect("delete succeeds");
}

#[rstest]
#[tokio::test]
async fn update_reports_the_image_as_stored(owner: UserId) {
    let mut mocks = Mocks::default();
    let existing = sample_recipe(owner);
    mocks
        .recipes
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    mocks
        .recipes
        .expect_update_details()
        .times(1)
        .returning(|recipe| {
            let mut stored = recipe.clone();
            stored.image = Some(ImagePath::from_stored(
                "uploads/recipe/fresh.png".to_owned(),
            ));
            Ok(stored)
        });
    let service = mocks.into_service();

    let updated = service
        .update(&owner, RecipeId::new(7), RecipePatch::default())
        .await
        .expect("update succeeds");

    assert_eq!(
        updated.image.as_ref().map(ImagePath::as_str),
        Some("uploads/recipe/fresh.png")
    );
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_recipe_is_not_found(owner: UserId) {
    let mut mocks = Mocks::default();
    mocks.recipes.expect_delete().returning(|_, _| Ok(None));
    mocks.images.expect_remove().times(0);
    let service = mocks.into_service();

    let err = service
        .delete(&owner, RecipeId::new(7))
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn list_passes_the_filter_to_the_repository(owner: UserId) {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_list()
        .withf(|_, filter| filter.tag_ids == Some(BTreeSet::from([TagId::new(3)])))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    let service = mocks.into_service();

    let recipes = service
        .list(&owner, RecipeFilter::default().with_tags([TagId::new(3)]))
        .await
        .expect("list succeeds");
    assert!(recipes.is_empty());
}
