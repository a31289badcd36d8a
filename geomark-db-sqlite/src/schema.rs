table! {
    tagged_location (id) {
        id -> Text,
        lat -> Double,
        lng -> Double,
        created_at -> BigInt,
        description -> Text,
        category -> Text,
        street -> Nullable<Text>,
        zip -> Nullable<Text>,
        city -> Nullable<Text>,
        country -> Nullable<Text>,
        state -> Nullable<Text>,
    }
}
