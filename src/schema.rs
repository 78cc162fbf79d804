table! {
    user (username) {
        username -> Text,
        id -> Integer,
        rating -> Nullable<Integer>,
        points -> Double,
        performance_points -> Double,
        problem_count -> Integer,
        contests -> Text,
    }
}

table! {
    problem (code) {
        code -> Text,
        name -> Text,
        points -> Double,
        partial -> Bool,
        time_limit -> Double,
        memory_limit -> Integer,
        types -> Text,
        group -> Text,
        is_organization_private -> Bool,
    }
}

table! {
    submission (username, problem_code, date) {
        username -> Text,
        problem_code -> Text,
        date -> Timestamp,
        language_key -> Text,
        time -> Nullable<Double>,
        memory -> Nullable<Double>,
        points -> Nullable<Double>,
        result -> Nullable<Text>,
        score_num -> Nullable<Integer>,
        score_denom -> Nullable<Integer>,
    }
}

table! {
    contest (key) {
        key -> Text,
        name -> Text,
        is_rated -> Bool,
        participants -> Text,
    }
}

table! {
    organization (id) {
        id -> Integer,
        slug -> Text,
        short_name -> Text,
        is_open -> Bool,
        member_count -> Integer,
    }
}

table! {
    language (id) {
        id -> Integer,
        key -> Text,
        short_name -> Nullable<Text>,
        common_name -> Text,
    }
}

table! {
    judge (name) {
        name -> Text,
        online -> Bool,
        ping -> Nullable<Double>,
        load -> Nullable<Double>,
    }
}

table! {
    handle (account_id) {
        account_id -> BigInt,
        #[sql_name = "handle"]
        handle_name -> Text,
        user_id -> Integer,
    }
}

joinable!(submission -> problem (problem_code));
joinable!(submission -> user (username));

allow_tables_to_appear_in_same_query!(
    user,
    problem,
    submission,
    contest,
    organization,
    language,
    judge,
    handle,
);
