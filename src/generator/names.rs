//! Random student name generation.
//!
//! The generator needs plausible Russian full names (surname, given name,
//! patronymic, gender-consistent). The producer sits behind a trait so
//! tests can use a fixed sequence instead.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Produces one full name per call.
pub trait NameSource {
    fn full_name(&mut self) -> String;
}

const MALE_GIVEN: &[&str] = &[
    "Александр", "Алексей", "Андрей", "Антон", "Артём", "Владимир", "Дмитрий", "Егор", "Иван",
    "Кирилл", "Максим", "Михаил", "Никита", "Николай", "Павел", "Роман", "Сергей", "Степан",
    "Фёдор", "Юрий",
];

const FEMALE_GIVEN: &[&str] = &[
    "Алина", "Анастасия", "Анна", "Валерия", "Вера", "Виктория", "Дарья", "Екатерина", "Елена",
    "Ирина", "Ксения", "Мария", "Надежда", "Наталья", "Ольга", "Полина", "Светлана", "София",
    "Татьяна", "Юлия",
];

/// Masculine surname forms; the feminine form appends "а".
const SURNAMES: &[&str] = &[
    "Иванов", "Петров", "Сидоров", "Смирнов", "Кузнецов", "Попов", "Васильев", "Соколов",
    "Михайлов", "Новиков", "Фёдоров", "Морозов", "Волков", "Алексеев", "Лебедев", "Семёнов",
    "Егоров", "Павлов", "Козлов", "Степанов", "Николаев", "Орлов", "Андреев", "Макаров",
    "Никитин",
];

const MALE_PATRONYMIC: &[&str] = &[
    "Александрович", "Алексеевич", "Андреевич", "Владимирович", "Дмитриевич", "Иванович",
    "Максимович", "Михайлович", "Николаевич", "Павлович", "Петрович", "Романович", "Сергеевич",
    "Фёдорович", "Юрьевич",
];

const FEMALE_PATRONYMIC: &[&str] = &[
    "Александровна", "Алексеевна", "Андреевна", "Владимировна", "Дмитриевна", "Ивановна",
    "Максимовна", "Михайловна", "Николаевна", "Павловна", "Петровна", "Романовна", "Сергеевна",
    "Фёдоровна", "Юрьевна",
];

/// Samples gender-consistent "Фамилия Имя Отчество" triples.
pub struct RussianNames<R: Rng> {
    rng: R,
}

impl<R: Rng> RussianNames<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NameSource for RussianNames<R> {
    fn full_name(&mut self) -> String {
        let female = self.rng.random_bool(0.5);
        let surname = *SURNAMES.choose(&mut self.rng).expect("non-empty list");
        let (surname, given, patronymic) = if female {
            (
                format!("{surname}а"),
                *FEMALE_GIVEN.choose(&mut self.rng).expect("non-empty list"),
                *FEMALE_PATRONYMIC
                    .choose(&mut self.rng)
                    .expect("non-empty list"),
            )
        } else {
            (
                surname.to_owned(),
                *MALE_GIVEN.choose(&mut self.rng).expect("non-empty list"),
                *MALE_PATRONYMIC
                    .choose(&mut self.rng)
                    .expect("non-empty list"),
            )
        };
        format!("{surname} {given} {patronymic}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn names_have_three_components() {
        let mut names = RussianNames::new(StdRng::seed_from_u64(7));
        for _ in 0..20 {
            let name = names.full_name();
            assert_eq!(name.split(' ').count(), 3, "unexpected shape: {name}");
        }
    }

    #[test]
    fn gender_agreement_between_surname_and_patronymic() {
        let mut names = RussianNames::new(StdRng::seed_from_u64(7));
        for _ in 0..50 {
            let name = names.full_name();
            let parts: Vec<&str> = name.split(' ').collect();
            let feminine_surname = parts[0].ends_with('а');
            let feminine_patronymic = parts[2].ends_with("на");
            assert_eq!(feminine_surname, feminine_patronymic, "mismatch: {name}");
        }
    }
}
