//! Sample trucks around New York City, used by `curbside seed`.

use jiff::Timestamp;

use crate::model::{
    Contact, Coordinate, DayHours, DayOfWeek, Dietary, Menu, MenuItem, NewTruck, Rating, Social,
    WeeklyHours,
};

/// Monday through Sunday.
type Week = [(&'static str, &'static str); 7];

pub fn sample_trucks() -> Vec<NewTruck> {
    let now = Timestamp::now();
    vec![
        NewTruck {
            id: None,
            name: "Taco Paradise".into(),
            description: "Authentic street tacos, burritos, and quesadillas made with fresh \
                          ingredients. Family recipes passed down for generations."
                .into(),
            cuisine_tags: tags(&["Mexican", "Tex-Mex"]),
            coordinate: Coordinate::new(40.7128, -74.0060),
            address: "123 Broadway, New York, NY 10001".into(),
            neighborhood: Some("Financial District".into()),
            weekly_hours: Some(week([
                ("11:00", "21:00"),
                ("11:00", "21:00"),
                ("11:00", "21:00"),
                ("11:00", "22:00"),
                ("11:00", "23:00"),
                ("10:00", "23:00"),
                ("12:00", "20:00"),
            ])),
            contact: Contact {
                phone: Some("(555) 123-4567".into()),
                social: Social {
                    instagram: Some("@tacoparadise".into()),
                    facebook: Some("tacoparadisenyc".into()),
                    ..Social::default()
                },
                ..Contact::default()
            },
            menu: Some(Menu {
                items: vec![
                    item(
                        "Street Tacos",
                        "3 soft corn tortillas with your choice of meat",
                        12.99,
                        "Tacos",
                    ),
                    item(
                        "California Burrito",
                        "Carne asada, fries, cheese, sour cream",
                        14.99,
                        "Burritos",
                    ),
                    item("Veggie Quesadilla", "Grilled vegetables and cheese", 10.99, "Vegetarian")
                        .with_dietary(&[Dietary::Vegetarian]),
                ],
                last_updated: now,
            }),
            rating: Rating {
                average: 4.5,
                count: 127,
            },
            active: true,
        },
        NewTruck {
            id: None,
            name: "Brooklyn BBQ Mobile".into(),
            description: "Slow-smoked meats and classic BBQ sides. Award-winning ribs and \
                          pulled pork sandwiches."
                .into(),
            cuisine_tags: tags(&["BBQ", "American"]),
            coordinate: Coordinate::new(40.6782, -73.9442),
            address: "456 Prospect Park West, Brooklyn, NY 11215".into(),
            neighborhood: Some("Park Slope".into()),
            weekly_hours: Some(week([
                ("12:00", "20:00"),
                ("12:00", "20:00"),
                ("12:00", "20:00"),
                ("12:00", "21:00"),
                ("12:00", "22:00"),
                ("11:00", "22:00"),
                ("11:00", "19:00"),
            ])),
            contact: Contact {
                phone: Some("(555) 234-5678".into()),
                website: Some("https://brooklynbbqmobile.com".into()),
                social: Social {
                    instagram: Some("@brooklynbbqmobile".into()),
                    ..Social::default()
                },
                ..Contact::default()
            },
            menu: Some(Menu {
                items: vec![
                    item(
                        "Pulled Pork Sandwich",
                        "Slow-smoked pulled pork with coleslaw",
                        13.99,
                        "Sandwiches",
                    ),
                    item("Baby Back Ribs", "Half rack with BBQ sauce", 18.99, "Ribs"),
                    item("Brisket Platter", "Sliced brisket with two sides", 22.99, "Platters"),
                ],
                last_updated: now,
            }),
            rating: Rating {
                average: 4.7,
                count: 89,
            },
            active: true,
        },
        NewTruck {
            id: None,
            name: "Seoul Kitchen Truck".into(),
            description: "Modern Korean fusion cuisine. Famous for our Korean BBQ bowls and \
                          kimchi fries."
                .into(),
            cuisine_tags: tags(&["Korean", "Asian"]),
            coordinate: Coordinate::new(40.7484, -73.9857),
            address: "789 8th Avenue, New York, NY 10019".into(),
            neighborhood: Some("Hell's Kitchen".into()),
            weekly_hours: Some(week([
                ("11:30", "21:30"),
                ("11:30", "21:30"),
                ("11:30", "21:30"),
                ("11:30", "22:00"),
                ("11:30", "22:30"),
                ("12:00", "22:30"),
                ("13:00", "20:00"),
            ])),
            contact: Contact {
                phone: Some("(555) 345-6789".into()),
                social: Social {
                    instagram: Some("@seoulkitchentruck".into()),
                    twitter: Some("@seoulkitchen".into()),
                    ..Social::default()
                },
                ..Contact::default()
            },
            menu: Some(Menu {
                items: vec![
                    item(
                        "Korean BBQ Bowl",
                        "Marinated beef bulgogi over rice with vegetables",
                        15.99,
                        "Bowls",
                    ),
                    item(
                        "Kimchi Fries",
                        "Crispy fries topped with kimchi and Korean chili sauce",
                        8.99,
                        "Sides",
                    )
                        .with_spice(3),
                    item(
                        "Bibimbap",
                        "Mixed rice bowl with vegetables and fried egg",
                        14.99,
                        "Bowls",
                    )
                        .with_dietary(&[Dietary::Vegetarian]),
                ],
                last_updated: now,
            }),
            rating: Rating {
                average: 4.6,
                count: 156,
            },
            active: true,
        },
        NewTruck {
            id: None,
            name: "Green Garden Vegan".into(),
            description: "Plant-based comfort food. Fresh salads, veggie burgers, and smoothie \
                          bowls made with organic ingredients."
                .into(),
            cuisine_tags: tags(&["Vegetarian", "Vegan", "Healthy"]),
            coordinate: Coordinate::new(40.7829, -73.9734),
            address: "321 Columbus Avenue, New York, NY 10023".into(),
            neighborhood: Some("Upper West Side".into()),
            weekly_hours: Some(week([
                ("10:00", "19:00"),
                ("10:00", "19:00"),
                ("10:00", "19:00"),
                ("10:00", "20:00"),
                ("10:00", "20:00"),
                ("09:00", "20:00"),
                ("09:00", "18:00"),
            ])),
            contact: Contact {
                phone: Some("(555) 456-7890".into()),
                website: Some("https://greengardenvegan.com".into()),
                social: Social {
                    instagram: Some("@greengardenvegan".into()),
                    ..Social::default()
                },
                ..Contact::default()
            },
            menu: Some(Menu {
                items: vec![
                    item(
                        "Beyond Burger",
                        "Plant-based patty with vegan cheese and avocado",
                        13.99,
                        "Burgers",
                    )
                        .with_dietary(&[Dietary::Vegan]),
                    item(
                        "Quinoa Power Bowl",
                        "Quinoa with roasted vegetables and tahini dressing",
                        12.99,
                        "Bowls",
                    )
                        .with_dietary(&[Dietary::Vegan, Dietary::GlutenFree]),
                    item(
                        "Acai Smoothie Bowl",
                        "Acai blend topped with granola and fresh fruits",
                        11.99,
                        "Smoothie Bowls",
                    )
                        .with_dietary(&[Dietary::Vegan]),
                ],
                last_updated: now,
            }),
            rating: Rating {
                average: 4.3,
                count: 94,
            },
            active: true,
        },
        NewTruck {
            id: None,
            name: "Little Italy Express".into(),
            description: "Authentic Italian street food. Wood-fired pizza, fresh pasta, and \
                          homemade gelato."
                .into(),
            cuisine_tags: tags(&["Italian"]),
            coordinate: Coordinate::new(40.7192, -73.9969),
            address: "654 Mulberry Street, New York, NY 10012".into(),
            neighborhood: Some("Little Italy".into()),
            weekly_hours: Some(week([
                ("11:00", "22:00"),
                ("11:00", "22:00"),
                ("11:00", "22:00"),
                ("11:00", "23:00"),
                ("11:00", "24:00"),
                ("10:00", "24:00"),
                ("10:00", "22:00"),
            ])),
            contact: Contact {
                phone: Some("(555) 567-8901".into()),
                email: Some("info@littleitalyexpress.com".into()),
                social: Social {
                    instagram: Some("@littleitalyexpress".into()),
                    facebook: Some("littleitalyexpressnyc".into()),
                    ..Social::default()
                },
                ..Contact::default()
            },
            menu: Some(Menu {
                items: vec![
                    item("Margherita Pizza", "Fresh mozzarella, tomato, and basil", 16.99, "Pizza")
                        .with_dietary(&[Dietary::Vegetarian]),
                    item("Penne Arrabbiata", "Spicy tomato sauce with fresh herbs", 14.99, "Pasta")
                        .with_spice(2)
                        .with_dietary(&[Dietary::Vegetarian]),
                    item(
                        "Pistachio Gelato",
                        "Homemade gelato with real pistachios",
                        6.99,
                        "Dessert",
                    )
                        .with_dietary(&[Dietary::Vegetarian]),
                ],
                last_updated: now,
            }),
            rating: Rating {
                average: 4.8,
                count: 203,
            },
            active: true,
        },
    ]
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn week(days: Week) -> WeeklyHours {
    let mut hours = WeeklyHours::empty();
    for (day, (open, close)) in DayOfWeek::ALL.into_iter().zip(days) {
        hours.insert(day, DayHours::new(open, close));
    }
    hours
}

fn item(name: &str, description: &str, price: f64, category: &str) -> MenuItem {
    MenuItem {
        name: name.into(),
        description: Some(description.into()),
        price,
        category: category.into(),
        dietary: Vec::new(),
        spicy_level: None,
    }
}

impl MenuItem {
    fn with_dietary(mut self, dietary: &[Dietary]) -> Self {
        self.dietary = dietary.to_vec();
        self
    }

    fn with_spice(mut self, level: u8) -> Self {
        self.spicy_level = Some(level);
        self
    }
}
