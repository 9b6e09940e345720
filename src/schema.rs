table! {
    pitt (pitt_id) {
        pitt_id -> Integer,
        name -> Text,
        role -> Text,
        permission -> Text,
        department -> Text,
    }
}

table! {
    graduate (grad_id) {
        grad_id -> Integer,
        pitt_id -> Integer,
    }
}

table! {
    cs (cs_id) {
        cs_id -> Integer,
        pitt_id -> Integer,
    }
}
