use crate::inventory::Vehicle;

/// Hand-maintained fallback catalog. Authored directly in canonical form, so
/// it skips normalization entirely; edit the entries here when the lot
/// changes and `INVENTORY_SOURCE=static` is in use.
pub fn fallback_catalog() -> Vec<Vehicle> {
    vec![
        Vehicle {
            id: "2013-toyota-prius-c".to_string(),
            title: "2013 Toyota Prius C".to_string(),
            year: Some(2013),
            make: "Toyota".to_string(),
            model: "Prius C".to_string(),
            trim: "Two".to_string(),
            mileage: Some(128_400),
            price: Some(8_995.0),
            transmission: "Automatic".to_string(),
            fuel: "Hybrid".to_string(),
            exterior: "Blue".to_string(),
            interior: "Gray cloth".to_string(),
            vin: "JTDKDTB31D1541772".to_string(),
            status: "available".to_string(),
            description: "One-owner commuter hybrid, recent tires and brakes.".to_string(),
            photos: vec![
                "https://lh3.googleusercontent.com/d/1PriusFront=w1600".to_string(),
                "https://lh3.googleusercontent.com/d/1PriusSide=w1600".to_string(),
            ],
        },
        Vehicle {
            id: "2016-honda-civic-lx".to_string(),
            title: "2016 Honda Civic LX".to_string(),
            year: Some(2016),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            trim: "LX".to_string(),
            mileage: Some(94_210),
            price: Some(12_450.0),
            transmission: "CVT".to_string(),
            fuel: "Gasoline".to_string(),
            exterior: "White".to_string(),
            interior: "Black cloth".to_string(),
            vin: "19XFC2F52GE223344".to_string(),
            status: "available".to_string(),
            description: "Clean title, backup camera, cold A/C.".to_string(),
            photos: vec![
                "https://lh3.googleusercontent.com/d/1CivicFront=w1600".to_string(),
            ],
        },
        Vehicle {
            id: "2012-ford-f150-xlt".to_string(),
            title: "2012 Ford F-150 XLT".to_string(),
            year: Some(2012),
            make: "Ford".to_string(),
            model: "F-150".to_string(),
            trim: "XLT".to_string(),
            mileage: Some(161_800),
            price: Some(10_900.0),
            transmission: "Automatic".to_string(),
            fuel: "Gasoline".to_string(),
            exterior: "Silver".to_string(),
            interior: "Gray cloth".to_string(),
            vin: "1FTFW1ET9CFA88215".to_string(),
            status: "pending".to_string(),
            description: "Work-ready crew cab, tow package, bed liner.".to_string(),
            photos: vec![
                "https://lh3.googleusercontent.com/d/1F150Front=w1600".to_string(),
                "https://lh3.googleusercontent.com/d/1F150Bed=w1600".to_string(),
            ],
        },
        Vehicle {
            id: "2018-nissan-sentra-sv".to_string(),
            title: "2018 Nissan Sentra SV".to_string(),
            year: Some(2018),
            make: "Nissan".to_string(),
            model: "Sentra".to_string(),
            trim: "SV".to_string(),
            mileage: Some(77_350),
            price: None,
            transmission: "CVT".to_string(),
            fuel: "Gasoline".to_string(),
            exterior: "Red".to_string(),
            interior: "Charcoal cloth".to_string(),
            vin: "3N1AB7AP4JY301958".to_string(),
            status: "coming soon".to_string(),
            description: "In reconditioning; call for pricing.".to_string(),
            photos: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_is_already_canonical() {
        let vehicles = fallback_catalog();
        assert!(!vehicles.is_empty());
        let ids: HashSet<&str> = vehicles.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids.len(), vehicles.len());
        for vehicle in &vehicles {
            assert!(!vehicle.id.is_empty());
            assert!(!vehicle.title.is_empty());
            for photo in &vehicle.photos {
                assert!(photo.starts_with("http"));
            }
        }
    }
}
