//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When
//! migrations change the schema, regenerate this file with
//! `diesel print-schema` or update it by hand.

diesel::table! {
    /// User accounts.
    ///
    /// `email` is unique and always stored lowercased.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised login email.
        email -> Varchar,
        /// Free-form name, possibly empty.
        name -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// Inactive accounts cannot log in.
        is_active -> Bool,
        /// Staff flag.
        is_staff -> Bool,
        /// Superuser flag.
        is_superuser -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user recipe tags.
    tags (id) {
        /// Primary key.
        id -> Int8,
        /// Owning user.
        user_id -> Uuid,
        /// Display name.
        name -> Varchar,
    }
}

diesel::table! {
    /// Per-user recipe ingredients.
    ingredients (id) {
        /// Primary key.
        id -> Int8,
        /// Owning user.
        user_id -> Uuid,
        /// Display name.
        name -> Varchar,
    }
}

diesel::table! {
    /// Recipes owned by a single user.
    recipes (id) {
        /// Primary key, monotonically increasing.
        id -> Int8,
        /// Owning user.
        user_id -> Uuid,
        /// Title.
        title -> Varchar,
        /// Preparation time in minutes (>= 1).
        time_minutes -> Int4,
        /// Price in cents (0..=99999).
        price_cents -> Int4,
        /// Relative path of the stored image under the media root.
        image -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe to tag links; cascade with either side.
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    /// Recipe to ingredient links; cascade with either side.
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Int8,
        ingredient_id -> Int8,
    }
}

diesel::joinable!(tags -> users (user_id));
diesel::joinable!(ingredients -> users (user_id));
diesel::joinable!(recipes -> users (user_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
);
