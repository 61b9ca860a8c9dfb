//! Request and response payloads for the recipe endpoints.
//!
//! Requests arrive as loosely typed JSON and are converted into domain
//! drafts and patches here, so handlers only ever see validated values.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, IngredientId, Price, Recipe, RecipeDraft, RecipePatch, RecipeTitle,
    RecipeValidationError, TagId, TimeMinutes,
};
use crate::inbound::http::taxonomy::TaxonomyItem;
use crate::inbound::http::validation::map_recipe_validation;

/// Price as sent by clients: a JSON number (`5.5`) or a decimal string
/// (`"5.50"`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    fn parse(&self) -> Result<Price, RecipeValidationError> {
        match self {
            Self::Number(number) => number.to_string().parse(),
            Self::Text(text) => text.parse(),
        }
    }
}

/// Body of `POST /api/v1/recipes` and `PUT /api/v1/recipes/{id}`.
///
/// Example JSON:
/// `{"title":"Soup","timeMinutes":10,"price":"5.50","tags":[1]}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub title: String,
    #[serde(alias = "time_minutes")]
    pub time_minutes: i64,
    #[schema(value_type = String, example = "5.50")]
    pub price: PriceInput,
    #[serde(default)]
    #[schema(value_type = Vec<i64>)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    #[schema(value_type = Vec<i64>)]
    pub ingredients: Vec<IngredientId>,
}

impl TryFrom<RecipeRequest> for RecipeDraft {
    type Error = Error;

    fn try_from(value: RecipeRequest) -> Result<Self, Self::Error> {
        let title = RecipeTitle::new(&value.title).map_err(map_recipe_validation)?;
        let time_minutes = TimeMinutes::new(value.time_minutes).map_err(map_recipe_validation)?;
        let price = value.price.parse().map_err(map_recipe_validation)?;
        Ok(RecipeDraft::new(title, time_minutes, price)
            .with_tags(value.tags)
            .with_ingredients(value.ingredients))
    }
}

/// Body of `PATCH /api/v1/recipes/{id}`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "time_minutes", skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "5.50")]
    pub price: Option<PriceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<i64>>)]
    pub tags: Option<Vec<TagId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<i64>>)]
    pub ingredients: Option<Vec<IngredientId>>,
}

impl TryFrom<RecipePatchRequest> for RecipePatch {
    type Error = Error;

    fn try_from(value: RecipePatchRequest) -> Result<Self, Self::Error> {
        let title = value
            .title
            .map(RecipeTitle::new)
            .transpose()
            .map_err(map_recipe_validation)?;
        let time_minutes = value
            .time_minutes
            .map(TimeMinutes::new)
            .transpose()
            .map_err(map_recipe_validation)?;
        let price = value
            .price
            .as_ref()
            .map(PriceInput::parse)
            .transpose()
            .map_err(map_recipe_validation)?;
        Ok(RecipePatch {
            title,
            time_minutes,
            price,
            tags: value.tags,
            ingredients: value.ingredients,
        })
    }
}

/// List representation of a recipe: related objects appear as ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Soup")]
    pub title: String,
    #[schema(example = 10)]
    pub time_minutes: i32,
    #[schema(example = "5.50")]
    pub price: String,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "uploads/recipe/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    pub image: Option<String>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.get(),
            title: recipe.title.to_string(),
            time_minutes: recipe.time_minutes.get(),
            price: recipe.price.to_string(),
            tags: recipe.tag_ids().into_iter().map(TagId::get).collect(),
            ingredients: recipe
                .ingredient_ids()
                .into_iter()
                .map(IngredientId::get)
                .collect(),
            image: recipe.image.as_ref().map(|path| path.as_str().to_owned()),
        }
    }
}

/// Single-recipe representation with nested tags and ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: String,
    pub tags: Vec<TaxonomyItem>,
    pub ingredients: Vec<TaxonomyItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&Recipe> for RecipeDetail {
    fn from(recipe: &Recipe) -> Self {
        let mut tags: Vec<TaxonomyItem> = recipe.tags.iter().map(TaxonomyItem::from).collect();
        tags.sort_by_key(|item| item.id);
        let mut ingredients: Vec<TaxonomyItem> = recipe
            .ingredients
            .iter()
            .map(TaxonomyItem::from)
            .collect();
        ingredients.sort_by_key(|item| item.id);
        Self {
            id: recipe.id.get(),
            title: recipe.title.to_string(),
            time_minutes: recipe.time_minutes.get(),
            price: recipe.price.to_string(),
            tags,
            ingredients,
            image: recipe.image.as_ref().map(|path| path.as_str().to_owned()),
        }
    }
}

/// Response of `POST /api/v1/recipes/{id}/upload-image`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct RecipeImageResponse {
    pub id: i64,
    #[schema(example = "uploads/recipe/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImagePath, Ingredient, RecipeId, Tag, UserId};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    #[fixture]
    fn recipe() -> Recipe {
        let owner = UserId::random();
        Recipe {
            id: RecipeId::new(3),
            owner,
            title: RecipeTitle::new("Soup").expect("title"),
            time_minutes: TimeMinutes::new(10).expect("minutes"),
            price: Price::from_cents(550).expect("price"),
            tags: vec![
                Tag {
                    id: TagId::new(9),
                    owner,
                    name: "Vegan".into(),
                },
                Tag {
                    id: TagId::new(2),
                    owner,
                    name: "Quick".into(),
                },
            ],
            ingredients: vec![Ingredient {
                id: IngredientId::new(4),
                owner,
                name: "Salt".into(),
            }],
            image: None,
        }
    }

    fn request(body: Value) -> RecipeRequest {
        serde_json::from_value(body).expect("request deserialises")
    }

    #[rstest]
    #[case(json!(5.5), 550)]
    #[case(json!("5.50"), 550)]
    #[case(json!("5.5"), 550)]
    #[case(json!(5), 500)]
    #[case(json!(5.0), 500)]
    fn create_accepts_numeric_and_string_prices(#[case] price: Value, #[case] cents: i64) {
        let draft = RecipeDraft::try_from(request(
            json!({"title": "Soup", "timeMinutes": 10, "price": price}),
        ))
        .expect("valid draft");
        assert_eq!(draft.price.cents(), cents);
        assert!(draft.tags.is_empty());
        assert!(draft.ingredients.is_empty());
    }

    #[rstest]
    #[case(json!({"title": " ", "timeMinutes": 10, "price": 1}), "title")]
    #[case(json!({"title": "Soup", "timeMinutes": 0, "price": 1}), "timeMinutes")]
    #[case(json!({"title": "Soup", "timeMinutes": 10, "price": "1000"}), "price")]
    #[case(json!({"title": "Soup", "timeMinutes": 10, "price": 1.234}), "price")]
    fn create_rejects_invalid_fields(#[case] body: Value, #[case] field: &str) {
        let err = RecipeDraft::try_from(request(body)).expect_err("invalid draft");
        let reported = err
            .details()
            .and_then(|details| details.get("field"))
            .and_then(Value::as_str);
        assert_eq!(reported, Some(field));
    }

    #[rstest]
    fn patch_keeps_absent_fields_untouched() {
        let body: RecipePatchRequest =
            serde_json::from_value(json!({"title": "Stew", "tags": []})).expect("patch");
        let patch = RecipePatch::try_from(body).expect("valid patch");
        assert_eq!(patch.title.map(|title| title.to_string()), Some("Stew".to_owned()));
        assert_eq!(patch.tags, Some(vec![]));
        assert!(patch.time_minutes.is_none());
        assert!(patch.price.is_none());
        assert!(patch.ingredients.is_none());
    }

    #[rstest]
    fn summary_lists_sorted_ids_and_decimal_price(recipe: Recipe) {
        let value = serde_json::to_value(RecipeSummary::from(&recipe)).expect("serialises");
        assert_eq!(
            value,
            json!({
                "id": 3,
                "title": "Soup",
                "timeMinutes": 10,
                "price": "5.50",
                "tags": [2, 9],
                "ingredients": [4],
            })
        );
    }

    #[rstest]
    fn detail_nests_related_objects(mut recipe: Recipe) {
        recipe.image = Some(ImagePath::from_stored("uploads/recipe/a.png".to_owned()));
        let value = serde_json::to_value(RecipeDetail::from(&recipe)).expect("serialises");
        assert_eq!(value["tags"], json!([{"id": 2, "name": "Quick"}, {"id": 9, "name": "Vegan"}]));
        assert_eq!(value["ingredients"], json!([{"id": 4, "name": "Salt"}]));
        assert_eq!(value["image"], json!("uploads/recipe/a.png"));
    }
}
